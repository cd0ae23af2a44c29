//! Patient form model
//!
//! Holds the five editable fields of a patient, their validation rules and
//! the per-field touched/dirty state that drives inline error display.

pub mod validators;

pub use validators::{ValidationError, Validator};

use crate::domain::{BirthDate, Patient, RegistryError, Result, UserId};

/// Editable field of the patient form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Nombre,
    Apellidos,
    FechaNacimiento,
    Domicilio,
    CorreoElectronico,
}

impl Field {
    /// All fields in display order
    pub const ALL: [Field; 5] = [
        Field::Nombre,
        Field::Apellidos,
        Field::FechaNacimiento,
        Field::Domicilio,
        Field::CorreoElectronico,
    ];

    /// Control name (the persisted field name)
    pub fn name(&self) -> &'static str {
        match self {
            Field::Nombre => "nombre",
            Field::Apellidos => "apellidos",
            Field::FechaNacimiento => "fechaNacimiento",
            Field::Domicilio => "domicilio",
            Field::CorreoElectronico => "correoElectronico",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Field::Nombre => "Nombre",
            Field::Apellidos => "Apellidos",
            Field::FechaNacimiento => "Fecha de nacimiento",
            Field::Domicilio => "Domicilio",
            Field::CorreoElectronico => "Correo electrónico",
        }
    }

    /// Validation rules for the field
    pub fn validators(&self) -> &'static [Validator] {
        match self {
            Field::Nombre => &[
                Validator::Required,
                Validator::MinLength(3),
                Validator::MaxLength(80),
                Validator::Letters,
            ],
            Field::Apellidos => &[
                Validator::Required,
                Validator::MinLength(3),
                Validator::MaxLength(200),
                Validator::Letters,
            ],
            Field::FechaNacimiento => &[Validator::Required, Validator::InputDate],
            Field::Domicilio => &[Validator::Required, Validator::MinLength(5)],
            Field::CorreoElectronico => &[Validator::Required, Validator::Email],
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// State of a single form control
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    /// Current raw value
    pub value: String,
    /// The user has interacted with (or submitted) the field
    pub touched: bool,
    /// The value was changed by the user
    pub dirty: bool,
}

/// Raw values of every field, as typed into the form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientFormValues {
    pub nombre: String,
    pub apellidos: String,
    pub fecha_nacimiento: String,
    pub domicilio: String,
    pub correo_electronico: String,
}

impl PatientFormValues {
    /// Form representation of a stored patient
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            nombre: patient.nombre.clone(),
            apellidos: patient.apellidos.clone(),
            fecha_nacimiento: patient.fecha_nacimiento.to_input_value(),
            domicilio: patient.domicilio.clone(),
            correo_electronico: patient.correo_electronico.clone(),
        }
    }

    /// Builds the patient to persist, stamped with `owner`
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Validation`] if the birth date does not parse.
    pub fn to_patient(&self, owner: UserId) -> Result<Patient> {
        let fecha_nacimiento = BirthDate::parse_input(&self.fecha_nacimiento).ok_or_else(|| {
            RegistryError::Validation(format!(
                "Invalid birth date '{}', expected YYYY-MM-DD",
                self.fecha_nacimiento
            ))
        })?;

        Ok(Patient {
            id: None,
            nombre: self.nombre.clone(),
            apellidos: self.apellidos.clone(),
            fecha_nacimiento,
            domicilio: self.domicilio.clone(),
            correo_electronico: self.correo_electronico.clone(),
            owner_id: Some(owner),
        })
    }

    fn get(&self, field: Field) -> &str {
        match field {
            Field::Nombre => &self.nombre,
            Field::Apellidos => &self.apellidos,
            Field::FechaNacimiento => &self.fecha_nacimiento,
            Field::Domicilio => &self.domicilio,
            Field::CorreoElectronico => &self.correo_electronico,
        }
    }
}

/// Fields of `patient` that would break a rule once normalized for storage
///
/// Stores trim text fields before writing, so a value padded with spaces
/// can pass the form rules and still persist too short or empty.
pub fn invalid_when_stored(patient: &Patient) -> Vec<Field> {
    let stored = PatientFormValues::from_patient(&patient.normalized());
    Field::ALL
        .into_iter()
        .filter(|field| !validators::validate(stored.get(*field), field.validators()).is_empty())
        .collect()
}

/// The patient form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientForm {
    fields: [FieldState; 5],
}

impl PatientForm {
    /// Empty, untouched form
    pub fn new() -> Self {
        Self::default()
    }

    /// State of a field
    pub fn field(&self, field: Field) -> &FieldState {
        &self.fields[field.index()]
    }

    /// Current value of a field
    pub fn value(&self, field: Field) -> &str {
        &self.fields[field.index()].value
    }

    /// User input: sets the value and marks the field dirty
    pub fn set_value(&mut self, field: Field, value: impl Into<String>) {
        let state = &mut self.fields[field.index()];
        state.value = value.into();
        state.dirty = true;
    }

    /// Marks a field as touched (blurred)
    pub fn touch(&mut self, field: Field) {
        self.fields[field.index()].touched = true;
    }

    /// Marks every field as touched so all inline errors show
    pub fn mark_all_touched(&mut self) {
        for state in self.fields.iter_mut() {
            state.touched = true;
        }
    }

    /// Programmatic fill; leaves touched/dirty flags alone
    pub fn patch_value(&mut self, values: &PatientFormValues) {
        for field in Field::ALL {
            self.fields[field.index()].value = values.get(field).to_string();
        }
    }

    /// Back to empty and untouched
    pub fn reset(&mut self) {
        self.fields = Default::default();
    }

    /// Validation failures of a field
    pub fn errors(&self, field: Field) -> Vec<ValidationError> {
        validators::validate(self.value(field), field.validators())
    }

    /// True when the field passes all its rules
    pub fn is_field_valid(&self, field: Field) -> bool {
        self.errors(field).is_empty()
    }

    /// Whether to render the field's errors inline
    pub fn shows_errors(&self, field: Field) -> bool {
        self.field(field).touched && !self.is_field_valid(field)
    }

    /// True when every field is valid
    pub fn is_valid(&self) -> bool {
        Field::ALL.iter().all(|f| self.is_field_valid(*f))
    }

    /// Fields currently failing validation
    pub fn invalid_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| !self.is_field_valid(*f))
            .collect()
    }

    /// Snapshot of all values
    pub fn values(&self) -> PatientFormValues {
        PatientFormValues {
            nombre: self.value(Field::Nombre).to_string(),
            apellidos: self.value(Field::Apellidos).to_string(),
            fecha_nacimiento: self.value(Field::FechaNacimiento).to_string(),
            domicilio: self.value(Field::Domicilio).to_string(),
            correo_electronico: self.value(Field::CorreoElectronico).to_string(),
        }
    }

    /// True when no field has been touched or changed and all are empty
    pub fn is_pristine(&self) -> bool {
        self.fields
            .iter()
            .all(|s| s.value.is_empty() && !s.touched && !s.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn filled() -> PatientForm {
        let mut form = PatientForm::new();
        form.set_value(Field::Nombre, "María");
        form.set_value(Field::Apellidos, "López García");
        form.set_value(Field::FechaNacimiento, "1990-05-17");
        form.set_value(Field::Domicilio, "Calle Mayor 1");
        form.set_value(Field::CorreoElectronico, "maria@example.com");
        form
    }

    #[test]
    fn test_empty_form_is_invalid_and_pristine() {
        let form = PatientForm::new();
        assert!(!form.is_valid());
        assert!(form.is_pristine());
        assert_eq!(form.invalid_fields().len(), 5);
        assert_eq!(form.errors(Field::Nombre), vec![ValidationError::Required]);
    }

    #[test]
    fn test_filled_form_is_valid() {
        assert!(filled().is_valid());
    }

    #[test]
    fn test_padded_values_fail_once_trimmed() {
        let mut form = filled();
        form.set_value(Field::Nombre, "     ");
        form.set_value(Field::Apellidos, "  a  ");
        assert!(form.is_valid());

        let patient = form.values().to_patient(UserId::new("uid-1").unwrap()).unwrap();
        assert_eq!(
            invalid_when_stored(&patient),
            vec![Field::Nombre, Field::Apellidos]
        );
    }

    #[test]
    fn test_valid_patient_passes_when_stored() {
        let patient = filled().values().to_patient(UserId::new("uid-1").unwrap()).unwrap();
        assert!(invalid_when_stored(&patient).is_empty());
    }

    #[test_case(2, false ; "two characters fail")]
    #[test_case(3, true ; "three characters pass")]
    #[test_case(80, true ; "eighty characters pass")]
    #[test_case(81, false ; "eighty one characters fail")]
    fn test_nombre_length_boundaries(len: usize, valid: bool) {
        let mut form = filled();
        form.set_value(Field::Nombre, "a".repeat(len));
        assert_eq!(form.is_field_valid(Field::Nombre), valid);
        assert_eq!(form.is_valid(), valid);
    }

    #[test_case(200, true ; "two hundred pass")]
    #[test_case(201, false ; "two hundred one fail")]
    fn test_apellidos_max_length(len: usize, valid: bool) {
        let mut form = filled();
        form.set_value(Field::Apellidos, "b".repeat(len));
        assert_eq!(form.is_field_valid(Field::Apellidos), valid);
    }

    #[test_case("Ana3" ; "digit")]
    #[test_case("Ana." ; "period")]
    #[test_case("Ana_María" ; "underscore")]
    #[test_case("Ana@" ; "at sign")]
    fn test_names_reject_digits_and_punctuation(value: &str) {
        let mut form = filled();
        form.set_value(Field::Nombre, value);
        form.set_value(Field::Apellidos, value);
        assert!(!form.is_field_valid(Field::Nombre));
        assert!(!form.is_field_valid(Field::Apellidos));
    }

    #[test]
    fn test_domicilio_min_length() {
        let mut form = filled();
        form.set_value(Field::Domicilio, "C/ 1");
        assert!(!form.is_field_valid(Field::Domicilio));
        form.set_value(Field::Domicilio, "C/ 12");
        assert!(form.is_field_valid(Field::Domicilio));
    }

    #[test]
    fn test_shows_errors_only_when_touched() {
        let mut form = PatientForm::new();
        assert!(!form.shows_errors(Field::CorreoElectronico));
        form.touch(Field::CorreoElectronico);
        assert!(form.shows_errors(Field::CorreoElectronico));
        form.mark_all_touched();
        assert!(Field::ALL.iter().all(|f| form.shows_errors(*f)));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut form = filled();
        form.mark_all_touched();
        form.reset();
        let once = form.clone();
        form.reset();
        assert_eq!(form, once);
        assert!(form.is_pristine());
    }

    #[test]
    fn test_patch_value_keeps_flags() {
        let mut form = PatientForm::new();
        form.patch_value(&filled().values());
        assert!(form.is_valid());
        assert!(!form.field(Field::Nombre).dirty);
        assert!(!form.field(Field::Nombre).touched);
    }

    #[test]
    fn test_values_to_patient_parses_date_and_sets_owner() {
        let owner = UserId::new("uid-7").unwrap();
        let patient = filled().values().to_patient(owner.clone()).unwrap();
        assert_eq!(patient.owner_id, Some(owner));
        assert_eq!(patient.fecha_nacimiento.to_input_value(), "1990-05-17");
        assert!(patient.id.is_none());
    }

    #[test]
    fn test_values_to_patient_rejects_bad_date() {
        let mut values = filled().values();
        values.fecha_nacimiento = "yesterday".to_string();
        let result = values.to_patient(UserId::new("uid").unwrap());
        assert!(matches!(result, Err(RegistryError::Validation(_))));
    }
}
