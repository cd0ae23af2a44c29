//! Firestore document models
//!
//! Firestore's REST surface wraps every field in a typed value object
//! (`{"stringValue": "..."}`, `{"timestampValue": "..."}`). This module maps
//! between those documents and [`Patient`] records.

use crate::domain::{
    BackendTimestamp, BirthDate, Patient, PatientId, PatientUpdate, RegistryError, Result,
    StoreError, UserId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Typed Firestore field value (only the kinds the registry writes)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_value: Option<String>,
}

impl FirestoreValue {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            string_value: Some(value.into()),
            ..Default::default()
        }
    }

    pub fn timestamp(value: impl Into<String>) -> Self {
        Self {
            timestamp_value: Some(value.into()),
            ..Default::default()
        }
    }
}

/// Firestore document resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirestoreDocument {
    /// Full resource name, `projects/.../documents/pacientes/{id}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub fields: BTreeMap<String, FirestoreValue>,
}

impl FirestoreDocument {
    /// Document key: the last segment of the resource name
    pub fn document_id(&self) -> Option<PatientId> {
        self.name
            .as_deref()
            .and_then(|name| name.rsplit('/').next())
            .and_then(|id| PatientId::new(id).ok())
    }

    fn string_field(&self, key: &str) -> String {
        self.fields
            .get(key)
            .and_then(|v| v.string_value.clone())
            .unwrap_or_default()
    }

    fn birth_date_field(&self) -> BirthDate {
        let Some(value) = self.fields.get("fechaNacimiento") else {
            return BirthDate::Iso(String::new());
        };

        if let Some(ref raw) = value.timestamp_value {
            return match BackendTimestamp::parse_rfc3339(raw) {
                Some(ts) => BirthDate::Timestamp(ts),
                None => BirthDate::Iso(raw.clone()),
            };
        }

        BirthDate::Iso(value.string_value.clone().unwrap_or_default())
    }

    /// Reads the document back as a patient
    ///
    /// # Errors
    ///
    /// Returns an error if the document has no usable resource name.
    pub fn to_patient(&self) -> Result<Patient> {
        let id = self.document_id().ok_or_else(|| {
            StoreError::InvalidResponse(format!(
                "document without a usable name: {:?}",
                self.name
            ))
        })?;

        let owner_id = self
            .fields
            .get("ownerId")
            .and_then(|v| v.string_value.as_deref())
            .and_then(|v| UserId::new(v).ok());

        Ok(Patient {
            id: Some(id),
            nombre: self.string_field("nombre"),
            apellidos: self.string_field("apellidos"),
            fecha_nacimiento: self.birth_date_field(),
            domicilio: self.string_field("domicilio"),
            correo_electronico: self.string_field("correoElectronico"),
            owner_id,
        })
    }

    /// Builds the document body for a new patient
    ///
    /// # Errors
    ///
    /// Returns an error if the birth date cannot be expressed as a timestamp.
    pub fn from_patient(patient: &Patient) -> Result<Self> {
        Self::from_update(&PatientUpdate::from(patient.clone()))
    }

    /// Builds a document carrying only the present fields of `changes`
    ///
    /// # Errors
    ///
    /// Returns an error if the birth date cannot be expressed as a timestamp.
    pub fn from_update(changes: &PatientUpdate) -> Result<Self> {
        let mut fields = BTreeMap::new();

        let strings = [
            ("nombre", &changes.nombre),
            ("apellidos", &changes.apellidos),
            ("domicilio", &changes.domicilio),
            ("correoElectronico", &changes.correo_electronico),
        ];
        for (key, value) in strings {
            if let Some(v) = value {
                fields.insert(key.to_string(), FirestoreValue::string(v.clone()));
            }
        }

        if let Some(ref date) = changes.fecha_nacimiento {
            let rendered = date
                .to_timestamp()
                .and_then(|ts| ts.to_rfc3339())
                .ok_or_else(|| {
                    RegistryError::Validation(format!("birth date cannot be stored: {date:?}"))
                })?;
            fields.insert(
                "fechaNacimiento".to_string(),
                FirestoreValue::timestamp(rendered),
            );
        }

        if let Some(ref owner) = changes.owner_id {
            fields.insert("ownerId".to_string(), FirestoreValue::string(owner.as_str()));
        }

        Ok(Self { name: None, fields })
    }
}

/// One element of a `documents:runQuery` response
///
/// Elements without a document only carry progress information.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryItem {
    #[serde(default)]
    pub document: Option<FirestoreDocument>,
}

/// Structured query listing a collection ordered by `nombre`
pub fn ordered_by_nombre_query(collection: &str) -> serde_json::Value {
    serde_json::json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "orderBy": [{
                "field": { "fieldPath": "nombre" },
                "direction": "ASCENDING"
            }]
        }
    })
}
