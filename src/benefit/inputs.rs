//! Member inputs collected by the calculator front end

use serde::{Deserialize, Deserializer, Serialize};

/// Gender of the member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    #[serde(alias = "female", alias = "F")]
    Female,
    #[serde(alias = "male", alias = "M")]
    Male,
}

/// Everything the front end collects about a member
///
/// `is_teacher` and `gender` are carried through but do not yet change the
/// calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitInputs {
    pub age: u32,
    pub years_of_service: u32,
    pub salary: f64,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_teacher: bool,
    #[serde(default)]
    pub gender: Gender,
}

impl BenefitInputs {
    pub fn new(age: u32, years_of_service: u32, salary: f64) -> Self {
        Self {
            age,
            years_of_service,
            salary,
            is_teacher: false,
            gender: Gender::default(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Accepts booleans as well as the form's `Yes`/`No` answers
pub(crate) fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(n) => Err(serde::de::Error::custom(format!("expected yes/no, got {n}"))),
        Flag::Text(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => Ok(true),
            "no" | "n" | "false" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected yes/no, got '{other}'"
            ))),
        },
    }
}
