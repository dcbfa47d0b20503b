use crate::error::{
    InvalidFieldValueSnafu, InvalidFieldsSnafu, InvalidJsonSnafu, NoDataProvidedSnafu,
    NotAnObjectSnafu, RosterResult,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use snafu::{OptionExt, ResultExt, ensure};

pub const FIELDNAMES: [&str; 4] = ["id", "first_name", "last_name", "age"];

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Student {
    pub id: u32,
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub age: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeUpdate {
    pub age: i64,
}

/// A JSON object straight off the wire, before its key set has been checked.
#[derive(Debug, Clone)]
pub struct Payload(Map<String, Value>);

impl Payload {
    ///empty bodies, `null` and `{}` all count as "no data"
    pub fn from_body(body: &[u8]) -> RosterResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return NoDataProvidedSnafu.fail();
        }

        match serde_json::from_slice(body).context(InvalidJsonSnafu)? {
            Value::Null => NoDataProvidedSnafu.fail(),
            Value::Object(map) if map.is_empty() => NoDataProvidedSnafu.fail(),
            Value::Object(map) => Ok(Self(map)),
            _ => NotAnObjectSnafu.fail(),
        }
    }

    pub fn has_exactly(&self, keys: &[&str]) -> bool {
        self.0.len() == keys.len() && keys.iter().all(|key| self.0.contains_key(*key))
    }

    fn name(&self, field: &'static str) -> RosterResult<String> {
        let name = self
            .0
            .get(field)
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .context(InvalidFieldValueSnafu {
                field,
                reason: "expected a non-empty string",
            })?;
        Ok(name.to_string())
    }

    fn age(&self) -> RosterResult<i64> {
        let age = match self.0.get("age") {
            Some(Value::Number(n)) => n.as_i64(),
            //stored as text on disk, so accept it as text on the way in too
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };

        age.context(InvalidFieldValueSnafu {
            field: "age",
            reason: "expected an integer",
        })
    }
}

impl NewStudent {
    pub const FIELDS: [&'static str; 3] = ["first_name", "last_name", "age"];

    pub fn from_payload(payload: &Payload, operation: &'static str) -> RosterResult<Self> {
        ensure!(
            payload.has_exactly(&Self::FIELDS),
            InvalidFieldsSnafu {
                operation,
                required: "first_name, last_name, age",
            }
        );

        Ok(Self {
            first_name: payload.name("first_name")?,
            last_name: payload.name("last_name")?,
            age: payload.age()?,
        })
    }

    pub fn into_student(self, id: u32) -> Student {
        let Self {
            first_name,
            last_name,
            age,
        } = self;
        Student {
            id,
            first_name,
            last_name,
            age,
        }
    }
}

impl AgeUpdate {
    pub const FIELDS: [&'static str; 1] = ["age"];

    pub fn from_payload(payload: &Payload) -> RosterResult<Self> {
        ensure!(
            payload.has_exactly(&Self::FIELDS),
            InvalidFieldsSnafu {
                operation: "PATCH",
                required: "only age",
            }
        );

        Ok(Self { age: payload.age()? })
    }
}

impl Student {
    pub fn replace_with(&mut self, new: NewStudent) {
        self.first_name = new.first_name;
        self.last_name = new.last_name;
        self.age = new.age;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RosterError;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        Payload::from_body(value.to_string().as_bytes()).expect("valid payload")
    }

    #[test]
    fn empty_bodies_have_no_data() {
        for body in ["", "  \n", "null", "{}"] {
            assert!(
                matches!(
                    Payload::from_body(body.as_bytes()),
                    Err(RosterError::NoDataProvided)
                ),
                "{body:?} should count as no data"
            );
        }
    }

    #[test]
    fn non_objects_and_garbage_are_rejected() {
        assert!(matches!(
            Payload::from_body(b"[1, 2]"),
            Err(RosterError::NotAnObject)
        ));
        assert!(matches!(
            Payload::from_body(b"{\"age\": "),
            Err(RosterError::InvalidJson { .. })
        ));
    }

    #[test]
    fn new_student_needs_exact_field_set() {
        let extra = payload(json!({
            "first_name": "Ivan",
            "last_name": "Petrenko",
            "age": 20,
            "id": 7
        }));
        let missing = payload(json!({"first_name": "Ivan", "age": 20}));
        let both = payload(json!({"first_name": "Ivan", "age": 20, "nickname": "V"}));

        for p in [extra, missing, both] {
            assert!(matches!(
                NewStudent::from_payload(&p, "POST"),
                Err(RosterError::InvalidFields { .. })
            ));
        }

        let ok = NewStudent::from_payload(
            &payload(json!({"first_name": "Ivan", "last_name": "Petrenko", "age": 20})),
            "POST",
        )
        .expect("exact field set");
        assert_eq!(ok.first_name, "Ivan");
        assert_eq!(ok.last_name, "Petrenko");
        assert_eq!(ok.age, 20);
    }

    #[test]
    fn field_values_are_checked() {
        let blank_name = payload(json!({"first_name": " ", "last_name": "Petrenko", "age": 20}));
        assert!(matches!(
            NewStudent::from_payload(&blank_name, "PUT"),
            Err(RosterError::InvalidFieldValue {
                field: "first_name",
                ..
            })
        ));

        let fractional_age = payload(json!({
            "first_name": "Ivan",
            "last_name": "Petrenko",
            "age": 1.5
        }));
        assert!(matches!(
            NewStudent::from_payload(&fractional_age, "PUT"),
            Err(RosterError::InvalidFieldValue { field: "age", .. })
        ));

        let negative_age = payload(json!({
            "first_name": "Ivan",
            "last_name": "Petrenko",
            "age": -1
        }));
        assert_eq!(
            NewStudent::from_payload(&negative_age, "PUT").unwrap().age,
            -1
        );

        let textual_age = payload(json!({"age": "25"}));
        assert_eq!(AgeUpdate::from_payload(&textual_age).unwrap().age, 25);
    }

    #[test]
    fn names_are_kept_as_sent() {
        let padded = payload(json!({
            "first_name": " Ivan ",
            "last_name": "Petrenko ",
            "age": 20
        }));
        let student = NewStudent::from_payload(&padded, "POST").unwrap();
        assert_eq!(student.first_name, " Ivan ");
        assert_eq!(student.last_name, "Petrenko ");
    }

    #[test]
    fn age_update_rejects_anything_but_age() {
        let p = payload(json!({"age": 30, "first_name": "Oleg"}));
        let err = AgeUpdate::from_payload(&p).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid fields for PATCH. Required: only age"
        );
    }
}
