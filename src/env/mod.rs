use crate::supplier::Settings;
use amplify_derive::Display;
use log::debug;
use std::env;
use thiserror::Error;

pub const SPOTIFY_API_CLIENT_ID: &str = "SPOTIFY_API_CLIENT_ID";
pub const SPOTIFY_API_CLIENT_SECRET: &str = "SPOTIFY_API_CLIENT_SECRET";
pub const TRACK_BUFFER_CAPACITY: &str = "TRACK_BUFFER_CAPACITY";

#[derive(Error, Display, Debug)]
#[display(Debug)]
pub enum EnvError {
    Missing(&'static str),
    Invalid {
        variable: &'static str,
        value: String,
    },
}

/// Loads a `.env` file from the working directory or its parents, if there is one. Variables
/// already set in the environment take precedence.
pub fn load_dotenv() {
    if let Err(error) = dotenv::dotenv() {
        debug!("No .env file was loaded: {error}");
    }
}

pub fn spotify_api_credentials() -> Result<rspotify::Credentials, EnvError> {
    spotify_api_credentials_from(|variable| env::var(variable).ok())
}

pub fn supplier_settings() -> Result<Settings, EnvError> {
    supplier_settings_from(|variable| env::var(variable).ok())
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    variable: &'static str,
) -> Result<String, EnvError> {
    lookup(variable)
        .filter(|value| !value.trim().is_empty())
        .ok_or(EnvError::Missing(variable))
}

fn spotify_api_credentials_from(
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<rspotify::Credentials, EnvError> {
    Ok(rspotify::Credentials::new(
        &required(&lookup, SPOTIFY_API_CLIENT_ID)?,
        &required(&lookup, SPOTIFY_API_CLIENT_SECRET)?,
    ))
}

fn supplier_settings_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Settings, EnvError> {
    let mut settings = Settings::default();

    if let Some(value) = lookup(TRACK_BUFFER_CAPACITY) {
        settings.buffer_capacity = value
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|capacity| *capacity >= 1)
            .ok_or(EnvError::Invalid {
                variable: TRACK_BUFFER_CAPACITY,
                value,
            })?;
    }

    Ok(settings)
}
