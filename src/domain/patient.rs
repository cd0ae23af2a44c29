//! Patient domain model
//!
//! The registry has a single entity. Field names on the wire follow the
//! persisted record shape of the `pacientes` collection.

use super::birth_date::BirthDate;
use super::ids::{PatientId, UserId};
use serde::{Deserialize, Serialize};

/// A patient record
///
/// `id` is absent until the record store assigns one; records read back from
/// the store always carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    /// Store-assigned document key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PatientId>,

    /// Given name
    pub nombre: String,

    /// Surname(s)
    pub apellidos: String,

    /// Birth date
    #[serde(rename = "fechaNacimiento")]
    pub fecha_nacimiento: BirthDate,

    /// Postal address
    pub domicilio: String,

    /// Email address, lowercase and trimmed once persisted
    #[serde(rename = "correoElectronico")]
    pub correo_electronico: String,

    /// User that last wrote the record
    #[serde(rename = "ownerId", default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<UserId>,
}

impl Patient {
    /// Returns the record stamped with `owner`
    pub fn with_owner(mut self, owner: Option<UserId>) -> Self {
        self.owner_id = owner;
        self
    }

    /// Returns the record with the given document key
    pub fn with_id(mut self, id: PatientId) -> Self {
        self.id = Some(id);
        self
    }

    /// Applies the write normalization policy
    ///
    /// Name, surname and address are trimmed; the email is lowercased and
    /// trimmed. The birth date and owner pass through.
    pub fn normalized(&self) -> Patient {
        Patient {
            id: self.id.clone(),
            nombre: self.nombre.trim().to_string(),
            apellidos: self.apellidos.trim().to_string(),
            fecha_nacimiento: self.fecha_nacimiento.clone(),
            domicilio: self.domicilio.trim().to_string(),
            correo_electronico: normalize_email(&self.correo_electronico),
            owner_id: self.owner_id.clone(),
        }
    }

    /// Full name as shown in the patient list
    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellidos)
    }
}

/// Partial update of a patient record
///
/// Only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientUpdate {
    pub nombre: Option<String>,
    pub apellidos: Option<String>,
    pub fecha_nacimiento: Option<BirthDate>,
    pub domicilio: Option<String>,
    pub correo_electronico: Option<String>,
    pub owner_id: Option<UserId>,
}

impl PatientUpdate {
    /// Applies the write normalization policy to the present fields
    pub fn normalized(&self) -> PatientUpdate {
        PatientUpdate {
            nombre: self.nombre.as_deref().map(|v| v.trim().to_string()),
            apellidos: self.apellidos.as_deref().map(|v| v.trim().to_string()),
            fecha_nacimiento: self.fecha_nacimiento.clone(),
            domicilio: self.domicilio.as_deref().map(|v| v.trim().to_string()),
            correo_electronico: self.correo_electronico.as_deref().map(normalize_email),
            owner_id: self.owner_id.clone(),
        }
    }

    /// Persisted field names touched by this update, in document order
    pub fn field_paths(&self) -> Vec<&'static str> {
        let mut paths = Vec::new();
        if self.nombre.is_some() {
            paths.push("nombre");
        }
        if self.apellidos.is_some() {
            paths.push("apellidos");
        }
        if self.fecha_nacimiento.is_some() {
            paths.push("fechaNacimiento");
        }
        if self.domicilio.is_some() {
            paths.push("domicilio");
        }
        if self.correo_electronico.is_some() {
            paths.push("correoElectronico");
        }
        if self.owner_id.is_some() {
            paths.push("ownerId");
        }
        paths
    }

    /// True when the update would not write anything
    pub fn is_empty(&self) -> bool {
        self.field_paths().is_empty()
    }

    /// Writes the present fields onto `patient`
    pub fn apply_to(&self, patient: &mut Patient) {
        if let Some(ref v) = self.nombre {
            patient.nombre = v.clone();
        }
        if let Some(ref v) = self.apellidos {
            patient.apellidos = v.clone();
        }
        if let Some(ref v) = self.fecha_nacimiento {
            patient.fecha_nacimiento = v.clone();
        }
        if let Some(ref v) = self.domicilio {
            patient.domicilio = v.clone();
        }
        if let Some(ref v) = self.correo_electronico {
            patient.correo_electronico = v.clone();
        }
        if let Some(ref v) = self.owner_id {
            patient.owner_id = Some(v.clone());
        }
    }
}

impl From<Patient> for PatientUpdate {
    fn from(patient: Patient) -> Self {
        Self {
            nombre: Some(patient.nombre),
            apellidos: Some(patient.apellidos),
            fecha_nacimiento: Some(patient.fecha_nacimiento),
            domicilio: Some(patient.domicilio),
            correo_electronico: Some(patient.correo_electronico),
            owner_id: patient.owner_id,
        }
    }
}

/// Lowercases then trims an email address
pub fn normalize_email(value: &str) -> String {
    value.to_lowercase().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> Patient {
        Patient {
            id: None,
            nombre: "  María ".to_string(),
            apellidos: " López García".to_string(),
            fecha_nacimiento: BirthDate::Native(NaiveDate::from_ymd_opt(1990, 5, 17).unwrap()),
            domicilio: "Calle Mayor 1  ".to_string(),
            correo_electronico: "  Maria.Lopez@Example.COM ".to_string(),
            owner_id: None,
        }
    }

    #[test]
    fn test_normalized_trims_and_lowercases_email() {
        let normalized = sample().normalized();
        assert_eq!(normalized.nombre, "María");
        assert_eq!(normalized.apellidos, "López García");
        assert_eq!(normalized.domicilio, "Calle Mayor 1");
        assert_eq!(normalized.correo_electronico, "maria.lopez@example.com");
    }

    #[test]
    fn test_with_owner_and_id() {
        let owner = UserId::new("uid-1").unwrap();
        let patient = sample()
            .with_owner(Some(owner.clone()))
            .with_id(PatientId::new("doc-1").unwrap());
        assert_eq!(patient.owner_id, Some(owner));
        assert_eq!(patient.id.unwrap().as_str(), "doc-1");
    }

    #[test]
    fn test_update_field_paths_follow_present_fields() {
        let update = PatientUpdate {
            nombre: Some("Ana".to_string()),
            correo_electronico: Some("a@b.com".to_string()),
            ..Default::default()
        };
        assert_eq!(update.field_paths(), vec!["nombre", "correoElectronico"]);
        assert!(!update.is_empty());
        assert!(PatientUpdate::default().is_empty());
    }

    #[test]
    fn test_update_from_patient_and_apply() {
        let mut stored = sample().normalized();
        let mut changed = stored.clone();
        changed.domicilio = "  Avenida Sol 9 ".to_string();
        let update = PatientUpdate::from(changed).normalized();
        update.apply_to(&mut stored);
        assert_eq!(stored.domicilio, "Avenida Sol 9");
        assert_eq!(stored.nombre, "María");
    }

    #[test]
    fn test_serde_uses_persisted_field_names() {
        let json = serde_json::to_value(sample().normalized()).unwrap();
        assert!(json.get("fechaNacimiento").is_some());
        assert!(json.get("correoElectronico").is_some());
        assert!(json.get("id").is_none());
        assert!(json.get("ownerId").is_none());
    }
}
