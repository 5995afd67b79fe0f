use std::borrow::Cow;

use serde::Deserialize;


pub const STORAGE_KEY: &str = "todos-list";
pub const MOUNT_ID: &str = "root";
pub const SET_STORAGE: &str = "setStorage";


/// What to do when the stored state can't be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Startup fails before anything is mounted.
    #[default]
    Fail,
    /// The stored value is ignored and the application starts without flags.
    Discard,
}


#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage_key: Cow<'static, str>,
    pub mount_id: Cow<'static, str>,
    pub port: Cow<'static, str>,
    pub on_malformed: MalformedPolicy,
}

impl Config {
    #[inline]
    pub fn with_storage_key<A>(mut self, key: A) -> Self where A: Into<Cow<'static, str>> {
        self.storage_key = key.into();
        self
    }

    #[inline]
    pub fn with_mount_id<A>(mut self, id: A) -> Self where A: Into<Cow<'static, str>> {
        self.mount_id = id.into();
        self
    }

    #[inline]
    pub fn with_port<A>(mut self, port: A) -> Self where A: Into<Cow<'static, str>> {
        self.port = port.into();
        self
    }

    #[inline]
    pub fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.on_malformed = policy;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: Cow::Borrowed(STORAGE_KEY),
            mount_id: Cow::Borrowed(MOUNT_ID),
            port: Cow::Borrowed(SET_STORAGE),
            on_malformed: MalformedPolicy::Fail,
        }
    }
}
