//! Decoding configuration
//!
//! Document decoders never read global state. Everything they need is
//! carried by a [`Context`]: an [`OidRegistry`] mapping symbolic names to
//! object identifiers, and a [`Policy`] answering string-keyed lookups.
//!
//! ```rust
//! use der_codec::config::{Context, Settings, UnknownCritical};
//!
//! let settings: Settings = "x509/crl/unknown_critical = throw".parse().expect("settings");
//! let ctx = Context::new(Default::default(), settings);
//! assert_eq!(ctx.unknown_critical_action(), Ok(UnknownCritical::Throw));
//! ```

use crate::error::{ConfigError, X509Error};
use crate::oid::Oid;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Policy key deciding what to do with unknown critical CRL extensions
pub const UNKNOWN_CRITICAL_KEY: &str = "x509/crl/unknown_critical";

/// Settings keys with this prefix add entries to the OID registry
pub const OID_KEY_PREFIX: &str = "oid/";

/// A string-keyed configuration lookup
///
/// Implementations are shared by concurrent decodes and must be safe for
/// concurrent reads.
pub trait Policy: Send + Sync {
    fn get_string(&self, key: &str) -> Option<String>;
}

/// Action for a critical extension the decoder does not understand
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnknownCritical {
    Throw,
    Ignore,
}

//------------ Settings ------------------------------------------------------

/// In-memory settings, with defaults
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    /// Settings holding only the defaults
    pub fn new() -> Self {
        let mut values = HashMap::new();
        values.insert(UNKNOWN_CRITICAL_KEY.to_string(), "ignore".to_string());
        Settings { values }
    }

    /// Settings with no value at all, not even the defaults
    pub fn empty() -> Self {
        Settings {
            values: HashMap::new(),
        }
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::new()
    }
}

impl Policy for Settings {
    fn get_string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_string)
    }
}

/// Parse `key = value` lines on top of the defaults
///
/// Blank lines and lines starting with `#` are skipped.
impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut settings = Settings::new();
        for (idx, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or(ConfigError::MissingSeparator(idx + 1))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::EmptyKey(idx + 1));
            }
            settings.set(key, value.trim());
        }
        Ok(settings)
    }
}

//------------ OidRegistry ---------------------------------------------------

const BUILTIN_OIDS: &[(&str, &[u64])] = &[
    ("X520.CommonName", &[2, 5, 4, 3]),
    ("X520.Surname", &[2, 5, 4, 4]),
    ("X520.SerialNumber", &[2, 5, 4, 5]),
    ("X520.Country", &[2, 5, 4, 6]),
    ("X520.Locality", &[2, 5, 4, 7]),
    ("X520.State", &[2, 5, 4, 8]),
    ("X520.StreetAddress", &[2, 5, 4, 9]),
    ("X520.Organization", &[2, 5, 4, 10]),
    ("X520.OrganizationalUnit", &[2, 5, 4, 11]),
    ("X520.Title", &[2, 5, 4, 12]),
    ("PKCS9.EmailAddress", &[1, 2, 840, 113549, 1, 9, 1]),
    ("X509v3.SubjectKeyIdentifier", &[2, 5, 29, 14]),
    ("X509v3.KeyUsage", &[2, 5, 29, 15]),
    ("X509v3.SubjectAlternativeName", &[2, 5, 29, 17]),
    ("X509v3.IssuerAlternativeName", &[2, 5, 29, 18]),
    ("X509v3.BasicConstraints", &[2, 5, 29, 19]),
    ("X509v3.CRLNumber", &[2, 5, 29, 20]),
    ("X509v3.ReasonCode", &[2, 5, 29, 21]),
    ("X509v3.HoldInstructionCode", &[2, 5, 29, 23]),
    ("X509v3.InvalidityDate", &[2, 5, 29, 24]),
    ("X509v3.DeltaCRLIndicator", &[2, 5, 29, 27]),
    ("X509v3.IssuingDistributionPoint", &[2, 5, 29, 28]),
    ("X509v3.CertificateIssuer", &[2, 5, 29, 29]),
    ("X509v3.CRLDistributionPoints", &[2, 5, 29, 31]),
    ("X509v3.CertificatePolicies", &[2, 5, 29, 32]),
    ("X509v3.AuthorityKeyIdentifier", &[2, 5, 29, 35]),
    ("X509v3.ExtendedKeyUsage", &[2, 5, 29, 37]),
    ("RSA", &[1, 2, 840, 113549, 1, 1, 1]),
    ("RSA/EMSA3(SHA-1)", &[1, 2, 840, 113549, 1, 1, 5]),
    ("RSA/EMSA3(SHA-256)", &[1, 2, 840, 113549, 1, 1, 11]),
    ("RSA/EMSA3(SHA-384)", &[1, 2, 840, 113549, 1, 1, 12]),
    ("RSA/EMSA3(SHA-512)", &[1, 2, 840, 113549, 1, 1, 13]),
    ("DSA/EMSA1(SHA-1)", &[1, 2, 840, 10040, 4, 3]),
    ("ECDSA", &[1, 2, 840, 10045, 2, 1]),
    ("ECDSA/EMSA1(SHA-1)", &[1, 2, 840, 10045, 4, 1]),
    ("ECDSA/EMSA1(SHA-256)", &[1, 2, 840, 10045, 4, 3, 2]),
    ("ECDSA/EMSA1(SHA-384)", &[1, 2, 840, 10045, 4, 3, 3]),
    ("secp256r1", &[1, 2, 840, 10045, 3, 1, 7]),
    ("secp384r1", &[1, 3, 132, 0, 34]),
    ("secp521r1", &[1, 3, 132, 0, 35]),
];

/// Two-way map between symbolic names and object identifiers
#[derive(Clone, PartialEq)]
pub struct OidRegistry {
    by_name: HashMap<String, Oid>,
    by_oid: HashMap<Oid, String>,
}

impl OidRegistry {
    /// An empty registry
    pub fn new() -> Self {
        OidRegistry {
            by_name: HashMap::new(),
            by_oid: HashMap::new(),
        }
    }

    /// Register a name. An existing entry for the same name is replaced.
    pub fn add<S: Into<String>>(&mut self, name: S, oid: Oid) -> &mut Self {
        let name = name.into();
        if let Some(old) = self.by_name.insert(name.clone(), oid.clone()) {
            self.by_oid.remove(&old);
        }
        self.by_oid.insert(oid, name);
        self
    }

    pub fn lookup(&self, name: &str) -> Option<&Oid> {
        self.by_name.get(name)
    }

    pub fn name_of(&self, oid: &Oid) -> Option<&str> {
        self.by_oid.get(oid).map(String::as_str)
    }

    /// Like `lookup`, but a missing name is a configuration error
    pub fn require(&self, name: &str) -> Result<&Oid, X509Error> {
        self.lookup(name)
            .ok_or_else(|| X509Error::UnknownOidName(name.to_string()))
    }

    /// Add every `oid/<name> = <dotted oid>` entry of the settings
    pub fn load_settings(&mut self, settings: &Settings) -> Result<(), ConfigError> {
        for (key, value) in settings.iter() {
            if let Some(name) = key.strip_prefix(OID_KEY_PREFIX) {
                let oid = value
                    .parse::<Oid>()
                    .map_err(|_| ConfigError::InvalidOid(value.to_string()))?;
                self.add(name, oid);
            }
        }
        Ok(())
    }
}

impl Default for OidRegistry {
    /// Registry holding the names used by this crate
    fn default() -> Self {
        let mut registry = OidRegistry::new();
        for &(name, arcs) in BUILTIN_OIDS {
            registry.add(name, Oid::from(arcs));
        }
        registry
    }
}

impl fmt::Debug for OidRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OidRegistry")
            .field("entries", &self.by_name.len())
            .finish()
    }
}

//------------ Context -------------------------------------------------------

/// Everything a document decoder consults besides its input
pub struct Context {
    registry: OidRegistry,
    policy: Box<dyn Policy>,
}

impl Context {
    pub fn new<P: Policy + 'static>(registry: OidRegistry, policy: P) -> Self {
        Context {
            registry,
            policy: Box::new(policy),
        }
    }

    /// Build a context from settings, loading `oid/` entries into the default registry
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let mut registry = OidRegistry::default();
        registry.load_settings(&settings)?;
        Ok(Context::new(registry, settings))
    }

    pub fn registry(&self) -> &OidRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &dyn Policy {
        self.policy.as_ref()
    }

    /// Shortcut for `registry().require(name)`
    pub fn oid(&self, name: &str) -> Result<&Oid, X509Error> {
        self.registry.require(name)
    }

    /// Ask the policy what to do with an unknown critical extension
    pub fn unknown_critical_action(&self) -> Result<UnknownCritical, X509Error> {
        let value = self.policy.get_string(UNKNOWN_CRITICAL_KEY);
        match value.as_deref() {
            Some("throw") => Ok(UnknownCritical::Throw),
            Some("ignore") => Ok(UnknownCritical::Ignore),
            _ => Err(X509Error::InvalidConfig {
                key: UNKNOWN_CRITICAL_KEY.to_string(),
                value,
            }),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::new(OidRegistry::default(), Settings::default())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("registry", &self.registry)
            .finish()
    }
}
