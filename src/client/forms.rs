//! Checks a form before it is sent, using the same rules the server applies.

use validator::Validate;

use crate::client::error::ClientError;
use crate::error::flatten_validation_errors;
use crate::models::users::password_is_complex;
use crate::models::RegisterForm;

pub fn check<T: Validate>(form: &T) -> Result<(), ClientError> {
    match form.validate() {
        Ok(()) => Ok(()),
        Err(errors) => Err(ClientError::Validation(
            flatten_validation_errors(&errors)
                .into_values()
                .flatten()
                .collect(),
        )),
    }
}

pub fn check_register(form: &RegisterForm) -> Result<(), ClientError> {
    let mut messages = match check(form) {
        Ok(()) => Vec::new(),
        Err(ClientError::Validation(messages)) => messages,
        Err(other) => return Err(other),
    };
    if !password_is_complex(&form.password) {
        messages.push("Password must be complex".to_string());
    }
    if messages.is_empty() {
        Ok(())
    } else {
        Err(ClientError::Validation(messages))
    }
}
