//! Registry value access behind a narrow, injectable backend.
//!
//! Hives and data types are plain integers so that diagnostics and the
//! in-memory test backend work identically on every platform; the native
//! backend maps them onto `winreg` only when compiled for Windows.
use std::io;

use super::error::ResourceError;
use crate::logging::Log;

/// `HKEY_CLASSES_ROOT`.
pub const HKEY_CLASSES_ROOT: u32 = 0x8000_0000;
/// `HKEY_CURRENT_USER`.
pub const HKEY_CURRENT_USER: u32 = 0x8000_0001;
/// `HKEY_LOCAL_MACHINE`.
pub const HKEY_LOCAL_MACHINE: u32 = 0x8000_0002;
/// `HKEY_USERS`.
pub const HKEY_USERS: u32 = 0x8000_0003;
/// `HKEY_PERFORMANCE_DATA`.
pub const HKEY_PERFORMANCE_DATA: u32 = 0x8000_0004;
/// `HKEY_CURRENT_CONFIG`.
pub const HKEY_CURRENT_CONFIG: u32 = 0x8000_0005;
/// `HKEY_DYN_DATA`.
pub const HKEY_DYN_DATA: u32 = 0x8000_0006;

/// No value type.
pub const REG_NONE: u32 = 0;
/// Null-terminated string.
pub const REG_SZ: u32 = 1;
/// String with unexpanded environment references.
pub const REG_EXPAND_SZ: u32 = 2;
/// Arbitrary binary data.
pub const REG_BINARY: u32 = 3;
/// 32-bit number.
pub const REG_DWORD: u32 = 4;
/// 32-bit little-endian number (same code as [`REG_DWORD`]).
pub const REG_DWORD_LITTLE_ENDIAN: u32 = 4;
/// 32-bit big-endian number.
pub const REG_DWORD_BIG_ENDIAN: u32 = 5;
/// Symbolic link.
pub const REG_LINK: u32 = 6;
/// Sequence of strings.
pub const REG_MULTI_SZ: u32 = 7;
/// Device-driver resource list.
pub const REG_RESOURCE_LIST: u32 = 8;
/// Hardware resource description.
pub const REG_FULL_RESOURCE_DESCRIPTOR: u32 = 9;
/// Hardware resource requirements.
pub const REG_RESOURCE_REQUIREMENTS_LIST: u32 = 10;
/// 64-bit number.
pub const REG_QWORD: u32 = 11;
/// 64-bit little-endian number (same code as [`REG_QWORD`]).
pub const REG_QWORD_LITTLE_ENDIAN: u32 = 11;

const HIVE_NAMES: &[(&str, u32)] = &[
    ("HKEY_CLASSES_ROOT", HKEY_CLASSES_ROOT),
    ("HKEY_CURRENT_USER", HKEY_CURRENT_USER),
    ("HKEY_LOCAL_MACHINE", HKEY_LOCAL_MACHINE),
    ("HKEY_USERS", HKEY_USERS),
    ("HKEY_PERFORMANCE_DATA", HKEY_PERFORMANCE_DATA),
    ("HKEY_CURRENT_CONFIG", HKEY_CURRENT_CONFIG),
    ("HKEY_DYN_DATA", HKEY_DYN_DATA),
];

const DATA_TYPE_NAMES: &[(&str, u32)] = &[
    ("REG_NONE", REG_NONE),
    ("REG_SZ", REG_SZ),
    ("REG_EXPAND_SZ", REG_EXPAND_SZ),
    ("REG_BINARY", REG_BINARY),
    ("REG_DWORD", REG_DWORD),
    ("REG_DWORD_LITTLE_ENDIAN", REG_DWORD_LITTLE_ENDIAN),
    ("REG_DWORD_BIG_ENDIAN", REG_DWORD_BIG_ENDIAN),
    ("REG_LINK", REG_LINK),
    ("REG_MULTI_SZ", REG_MULTI_SZ),
    ("REG_RESOURCE_LIST", REG_RESOURCE_LIST),
    ("REG_FULL_RESOURCE_DESCRIPTOR", REG_FULL_RESOURCE_DESCRIPTOR),
    ("REG_RESOURCE_REQUIREMENTS_LIST", REG_RESOURCE_REQUIREMENTS_LIST),
    ("REG_QWORD", REG_QWORD),
    ("REG_QWORD_LITTLE_ENDIAN", REG_QWORD_LITTLE_ENDIAN),
];

/// Display name of a hive, or `UNKNOWN_HIVE`.
///
/// Hive identifiers are unique, so this is an exact lookup.
#[must_use]
pub fn hive_name(hive: u32) -> &'static str {
    HIVE_NAMES
        .iter()
        .find(|(_, code)| *code == hive)
        .map_or("UNKNOWN_HIVE", |(name, _)| name)
}

/// Display name of a data type code, or `UNKNOWN_DATA_TYPE`.
///
/// Several names share a code (`REG_DWORD` and `REG_DWORD_LITTLE_ENDIAN`);
/// the shortest one wins.
///
/// # Examples
///
/// ```
/// use dotfiles_windows::resources::registry::{REG_DWORD, data_type_name};
///
/// assert_eq!(data_type_name(REG_DWORD), "REG_DWORD");
/// assert_eq!(data_type_name(0xFFFF), "UNKNOWN_DATA_TYPE");
/// ```
#[must_use]
pub fn data_type_name(code: u32) -> &'static str {
    shortest_name(DATA_TYPE_NAMES, code).unwrap_or("UNKNOWN_DATA_TYPE")
}

/// Pick the shortest name mapped to `code`, ties broken alphabetically.
fn shortest_name<'t>(table: &[(&'t str, u32)], code: u32) -> Option<&'t str> {
    table
        .iter()
        .filter(|(_, c)| *c == code)
        .map(|(name, _)| *name)
        .min_by_key(|name| (name.len(), *name))
}

/// A value read from or written to the registry, rendered as text.
///
/// Numeric types are rendered in decimal and strings verbatim, which is
/// enough for equality checks against a desired canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryValue {
    /// Textual form of the data.
    pub data: String,
    /// Data type code (`REG_SZ`, `REG_DWORD`, ...).
    pub data_type: u32,
}

impl RegistryValue {
    /// A `REG_SZ` value.
    #[must_use]
    pub fn string(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            data_type: REG_SZ,
        }
    }

    /// A `REG_DWORD` value.
    #[must_use]
    pub fn dword(data: u32) -> Self {
        Self {
            data: data.to_string(),
            data_type: REG_DWORD,
        }
    }
}

/// Per-value access to the live registry.
///
/// Keys are backslash-delimited paths relative to `hive`; `name` is the
/// value name within the key.
pub trait RegistryBackend: Send + Sync {
    /// Read a single value.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the key or value cannot be opened or read.
    fn query(&self, hive: u32, key: &str, name: &str) -> io::Result<RegistryValue>;

    /// Open `key` for write access and store `value` under `name`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the key cannot be opened for writing or the
    /// value cannot be stored.
    fn write(&self, hive: u32, key: &str, name: &str, value: &RegistryValue) -> io::Result<()>;
}

/// Registry backend over the Win32 registry API.
///
/// Every call fails with [`io::ErrorKind::Unsupported`] on other platforms.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeRegistry;

impl RegistryBackend for NativeRegistry {
    fn query(&self, hive: u32, key: &str, name: &str) -> io::Result<RegistryValue> {
        #[cfg(windows)]
        {
            native::query(hive, key, name)
        }
        #[cfg(not(windows))]
        {
            let _ = (hive, key, name);
            Err(unsupported())
        }
    }

    fn write(&self, hive: u32, key: &str, name: &str, value: &RegistryValue) -> io::Result<()> {
        #[cfg(windows)]
        {
            native::write(hive, key, name, value)
        }
        #[cfg(not(windows))]
        {
            let _ = (hive, key, name, value);
            Err(unsupported())
        }
    }
}

#[cfg(not(windows))]
fn unsupported() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        "the registry is only available on Windows",
    )
}

#[cfg(windows)]
mod native {
    use std::fmt::Write as _;
    use std::io;

    use winreg::RegKey;
    use winreg::enums::{
        HKEY_CLASSES_ROOT, HKEY_CURRENT_CONFIG, HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE,
        HKEY_USERS, KEY_SET_VALUE,
    };
    use winreg::types::FromRegValue;

    use super::{REG_DWORD, REG_EXPAND_SZ, REG_MULTI_SZ, REG_QWORD, REG_SZ, RegistryValue};

    fn predef(hive: u32) -> io::Result<RegKey> {
        let hkey = match hive {
            super::HKEY_CLASSES_ROOT => HKEY_CLASSES_ROOT,
            super::HKEY_CURRENT_USER => HKEY_CURRENT_USER,
            super::HKEY_LOCAL_MACHINE => HKEY_LOCAL_MACHINE,
            super::HKEY_USERS => HKEY_USERS,
            super::HKEY_CURRENT_CONFIG => HKEY_CURRENT_CONFIG,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("cannot open {}", super::hive_name(hive)),
                ));
            }
        };
        Ok(RegKey::predef(hkey))
    }

    pub(super) fn query(hive: u32, key: &str, name: &str) -> io::Result<RegistryValue> {
        let raw = predef(hive)?.open_subkey(key)?.get_raw_value(name)?;
        let data_type = raw.vtype.clone() as u32;
        let data = match data_type {
            REG_SZ | REG_EXPAND_SZ => String::from_reg_value(&raw)?,
            REG_DWORD => u32::from_reg_value(&raw)?.to_string(),
            REG_QWORD => u64::from_reg_value(&raw)?.to_string(),
            REG_MULTI_SZ => Vec::<String>::from_reg_value(&raw)?.join("\n"),
            _ => {
                let bytes: &[u8] = &raw.bytes;
                bytes.iter().fold(String::new(), |mut out, b| {
                    let _ = write!(out, "{b:02x}");
                    out
                })
            }
        };
        Ok(RegistryValue { data, data_type })
    }

    pub(super) fn write(
        hive: u32,
        key: &str,
        name: &str,
        value: &RegistryValue,
    ) -> io::Result<()> {
        let open_key = predef(hive)?.open_subkey_with_flags(key, KEY_SET_VALUE)?;
        match value.data_type {
            REG_SZ => open_key.set_value(name, &value.data),
            REG_DWORD => {
                let number: u32 = value
                    .data
                    .parse()
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                open_key.set_value(name, &number)
            }
            other => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("cannot write {}", super::data_type_name(other)),
            )),
        }
    }
}

/// Logging registry accessor used by resources.
///
/// Reads never fail: an unreadable key or value is reported as absent,
/// since both mean the value must be written. Writes surface the OS error.
#[derive(Clone, Copy)]
pub struct RegistryAccessor<'a> {
    backend: &'a dyn RegistryBackend,
    log: &'a dyn Log,
}

impl std::fmt::Debug for RegistryAccessor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryAccessor").finish_non_exhaustive()
    }
}

impl<'a> RegistryAccessor<'a> {
    /// Create an accessor over `backend` that logs to `log`.
    #[must_use]
    pub fn new(backend: &'a dyn RegistryBackend, log: &'a dyn Log) -> Self {
        Self { backend, log }
    }

    /// Read a value, or `None` if it cannot be read for any reason.
    #[must_use]
    pub fn get(&self, hive: u32, key: &str, name: &str) -> Option<RegistryValue> {
        let value = self.backend.query(hive, key, name).ok()?;
        let location = location(hive, key, name);
        self.log.debug(&format!(
            "{location} has data type {}",
            data_type_name(value.data_type)
        ));
        self.log
            .debug(&format!("{location} has value {}", value.data));
        Some(value)
    }

    /// Write a value.
    ///
    /// Only `REG_SZ` and `REG_DWORD` values can be written.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnsupportedDataType`] for any other data type,
    /// and [`ResourceError::Registry`] naming the location if the key cannot
    /// be opened for writing or the value cannot be stored.
    pub fn set(
        &self,
        hive: u32,
        key: &str,
        name: &str,
        value: &RegistryValue,
    ) -> Result<(), ResourceError> {
        if !is_writable(value.data_type) {
            return Err(ResourceError::UnsupportedDataType(
                data_type_name(value.data_type).to_string(),
            ));
        }
        let location = location(hive, key, name);
        self.log.debug(&format!(
            "Setting {location} to data type {}",
            data_type_name(value.data_type)
        ));
        self.log
            .debug(&format!("Setting {location} to value {}", value.data));
        self.backend
            .write(hive, key, name, value)
            .map_err(|source| ResourceError::Registry { location, source })
    }
}

/// Whether [`RegistryAccessor::set`] can store values of `data_type`.
#[must_use]
pub const fn is_writable(data_type: u32) -> bool {
    matches!(data_type, REG_SZ | REG_DWORD)
}

/// Render `hive\key\name` for log lines and errors.
#[must_use]
pub fn location(hive: u32, key: &str, name: &str) -> String {
    format!("{}\\{key}\\{name}", hive_name(hive))
}

/// In-memory registry backend for unit tests.
#[cfg(test)]
pub(crate) mod test_helpers {
    use std::collections::{BTreeMap, BTreeSet};
    use std::io;
    use std::sync::Mutex;

    use super::{RegistryBackend, RegistryValue};

    type Slot = (u32, String, String);

    /// Registry stored in a map, with write counting and injectable failures.
    #[derive(Debug, Default)]
    pub struct MemoryRegistry {
        values: Mutex<BTreeMap<Slot, RegistryValue>>,
        denied: Mutex<BTreeSet<Slot>>,
        unreadable: Mutex<BTreeSet<Slot>>,
        writes: Mutex<Vec<(Slot, RegistryValue)>>,
    }

    impl MemoryRegistry {
        pub fn new() -> Self {
            Self::default()
        }

        /// Seed a value.
        #[must_use]
        pub fn with(self, hive: u32, key: &str, name: &str, value: RegistryValue) -> Self {
            if let Ok(mut values) = self.values.lock() {
                values.insert((hive, key.to_string(), name.to_string()), value);
            }
            self
        }

        /// Make writes to this slot fail with `PermissionDenied`.
        #[must_use]
        pub fn deny_write(self, hive: u32, key: &str, name: &str) -> Self {
            if let Ok(mut denied) = self.denied.lock() {
                denied.insert((hive, key.to_string(), name.to_string()));
            }
            self
        }

        /// Make reads of this slot fail with `PermissionDenied`.
        #[must_use]
        pub fn deny_read(self, hive: u32, key: &str, name: &str) -> Self {
            if let Ok(mut unreadable) = self.unreadable.lock() {
                unreadable.insert((hive, key.to_string(), name.to_string()));
            }
            self
        }

        /// Current value of a slot.
        pub fn value(&self, hive: u32, key: &str, name: &str) -> Option<RegistryValue> {
            self.values
                .lock()
                .ok()?
                .get(&(hive, key.to_string(), name.to_string()))
                .cloned()
        }

        /// Number of successful writes.
        pub fn write_count(&self) -> usize {
            self.writes.lock().map_or(0, |w| w.len())
        }

        /// Value names written, in order.
        pub fn written_names(&self) -> Vec<String> {
            self.writes.lock().map_or_else(
                |_| vec![],
                |w| w.iter().map(|((_, _, name), _)| name.clone()).collect(),
            )
        }
    }

    impl RegistryBackend for MemoryRegistry {
        fn query(&self, hive: u32, key: &str, name: &str) -> io::Result<RegistryValue> {
            let slot = (hive, key.to_string(), name.to_string());
            let unreadable = self
                .unreadable
                .lock()
                .map_err(|_| io::Error::other("poisoned"))?
                .contains(&slot);
            if unreadable {
                return Err(io::Error::from(io::ErrorKind::PermissionDenied));
            }
            self.value(hive, key, name)
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }

        fn write(
            &self,
            hive: u32,
            key: &str,
            name: &str,
            value: &RegistryValue,
        ) -> io::Result<()> {
            let slot = (hive, key.to_string(), name.to_string());
            let denied = self
                .denied
                .lock()
                .map_err(|_| io::Error::other("poisoned"))?
                .contains(&slot);
            if denied {
                return Err(io::Error::from(io::ErrorKind::PermissionDenied));
            }
            self.values
                .lock()
                .map_err(|_| io::Error::other("poisoned"))?
                .insert(slot.clone(), value.clone());
            self.writes
                .lock()
                .map_err(|_| io::Error::other("poisoned"))?
                .push((slot, value.clone()));
            Ok(())
        }
    }
}
