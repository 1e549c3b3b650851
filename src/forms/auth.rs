use serde::{Deserialize, Serialize};
use serde_valid::Validate;

#[derive(Serialize, Deserialize, Debug, Validate)]
pub struct Login {
    #[validate(min_length = 3)]
    #[validate(max_length = 50)]
    pub username: String,
    #[validate(min_length = 6)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_credentials_are_rejected() {
        let form = Login {
            username: "ad".to_string(),
            password: "admin123".to_string(),
        };
        assert!(form.validate().is_err());

        let form = Login {
            username: "admin".to_string(),
            password: "123".to_string(),
        };
        assert!(form.validate().is_err());

        let form = Login {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        };
        assert!(form.validate().is_ok());
    }
}
