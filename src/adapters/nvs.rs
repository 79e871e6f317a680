//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`ConfigStore`] on one NVS namespace. The booth settings live
//! in [`NVS_NAMESPACE`](crate::config::NVS_NAMESPACE); the WiFi adapter
//! opens a second instance for the station credentials.
//!
//! - **`target_os = "espidf"`**: `EspNvs` on the default NVS partition.
//!   NVS entries are typed, so reading a key with the wrong getter yields
//!   [`StorageError::TypeMismatch`].
//! - **`not(target_os = "espidf")`**: in-memory map with the same typing
//!   rules, for host tests and simulation.

use log::info;

use crate::app::ports::{ConfigStore, StorageError};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{
    ESP_ERR_NVS_INVALID_LENGTH, ESP_ERR_NVS_KEY_TOO_LONG, ESP_ERR_NVS_NOT_ENOUGH_SPACE,
    ESP_ERR_NVS_TYPE_MISMATCH, EspError,
};

/// Longest key NVS accepts.
const MAX_KEY_LEN: usize = 15;

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, PartialEq, Eq)]
enum StoredValue {
    Str(String),
    I32(i32),
}

pub struct NvsAdapter {
    namespace: String,
    #[cfg(target_os = "espidf")]
    nvs: EspNvs<NvsDefault>,
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, StoredValue>>,
}

impl NvsAdapter {
    /// Open (creating if needed) `namespace` on the default partition.
    #[cfg(target_os = "espidf")]
    pub fn open(partition: EspDefaultNvsPartition, namespace: &str) -> Result<Self, StorageError> {
        let nvs = EspNvs::new(partition, namespace, true).map_err(|e| {
            log::error!("NvsAdapter: open '{}' failed: {}", namespace, e);
            map_esp_error(&e)
        })?;
        info!("NvsAdapter: namespace '{}' opened", namespace);
        Ok(Self {
            namespace: namespace.into(),
            nvs,
        })
    }

    /// Open an in-memory namespace.
    #[cfg(not(target_os = "espidf"))]
    pub fn open(namespace: &str) -> Result<Self, StorageError> {
        check_key(namespace)?;
        info!("NvsAdapter: simulation backend for '{}'", namespace);
        Ok(Self {
            namespace: namespace.into(),
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(&self, key: &str) -> String {
        format!("{}::{}", self.namespace, key)
    }
}

fn check_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() || key.len() > MAX_KEY_LEN {
        return Err(StorageError::TooLong);
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
fn map_esp_error(e: &EspError) -> StorageError {
    let code = e.code();
    if code == ESP_ERR_NVS_TYPE_MISMATCH as i32 {
        StorageError::TypeMismatch
    } else if code == ESP_ERR_NVS_NOT_ENOUGH_SPACE as i32 {
        StorageError::Full
    } else if code == ESP_ERR_NVS_KEY_TOO_LONG as i32 || code == ESP_ERR_NVS_INVALID_LENGTH as i32
    {
        StorageError::TooLong
    } else {
        StorageError::IoError
    }
}

#[cfg(target_os = "espidf")]
impl ConfigStore for NvsAdapter {
    fn get_str(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        let len = match self.nvs.str_len(key).map_err(|e| map_esp_error(&e))? {
            Some(len) => len,
            None => return Ok(None),
        };
        let mut buf = vec![0u8; len.max(1)];
        let value = self
            .nvs
            .get_str(key, &mut buf)
            .map_err(|e| map_esp_error(&e))?;
        Ok(value.map(Into::into))
    }

    fn put_str(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        check_key(key)?;
        self.nvs.set_str(key, value).map_err(|e| {
            log::warn!("NvsAdapter: write '{}' failed: {}", key, e);
            map_esp_error(&e)
        })
    }

    fn get_i32(&self, key: &str) -> Result<Option<i32>, StorageError> {
        check_key(key)?;
        self.nvs.get_i32(key).map_err(|e| map_esp_error(&e))
    }

    fn put_i32(&mut self, key: &str, value: i32) -> Result<(), StorageError> {
        check_key(key)?;
        self.nvs.set_i32(key, value).map_err(|e| {
            log::warn!("NvsAdapter: write '{}' failed: {}", key, e);
            map_esp_error(&e)
        })
    }
}

#[cfg(not(target_os = "espidf"))]
impl ConfigStore for NvsAdapter {
    fn get_str(&self, key: &str) -> Result<Option<String>, StorageError> {
        check_key(key)?;
        match self.store.borrow().get(&self.composite_key(key)) {
            Some(StoredValue::Str(s)) => Ok(Some(s.clone())),
            Some(StoredValue::I32(_)) => Err(StorageError::TypeMismatch),
            None => Ok(None),
        }
    }

    fn put_str(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        check_key(key)?;
        let k = self.composite_key(key);
        self.store.borrow_mut().insert(k, StoredValue::Str(value.into()));
        Ok(())
    }

    fn get_i32(&self, key: &str) -> Result<Option<i32>, StorageError> {
        check_key(key)?;
        match self.store.borrow().get(&self.composite_key(key)) {
            Some(StoredValue::I32(v)) => Ok(Some(*v)),
            Some(StoredValue::Str(_)) => Err(StorageError::TypeMismatch),
            None => Ok(None),
        }
    }

    fn put_i32(&mut self, key: &str, value: i32) -> Result<(), StorageError> {
        check_key(key)?;
        let k = self.composite_key(key);
        self.store.borrow_mut().insert(k, StoredValue::I32(value));
        Ok(())
    }
}
