//! Mobile JSON wire extensions.
//!
//! Appium drivers still expose a few JSON wire endpoints that never made it
//! into W3C WebDriver. [`MobileExtension::register`] defines them on a
//! [`Connection`] as custom commands:
//!
//! | Command | Method | Path |
//! |---------|--------|------|
//! | `getNetworkConnection` | GET | `/session/:sessionId/network_connection` |
//! | `setNetworkConnection` | POST | `/session/:sessionId/network_connection` |
//!
//! # Example
//!
//! ```ignore
//! use selenium_appium::{MobileExtension, NetworkConnectionType};
//!
//! let mobile = MobileExtension::register(&connection);
//! mobile.set_network_connection(NetworkConnectionType::AirplaneMode).await?;
//! assert_eq!(mobile.network_connection().await?, NetworkConnectionType::AirplaneMode);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde_json::{Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::{CommandDefinition, Method};

use super::connection::Connection;

// ============================================================================
// Constants
// ============================================================================

/// Name of the command reading the network connection.
pub const GET_NETWORK_CONNECTION: &str = "getNetworkConnection";

/// Name of the command changing the network connection.
pub const SET_NETWORK_CONNECTION: &str = "setNetworkConnection";

/// Route shared by both network connection commands.
const NETWORK_CONNECTION_PATH: &str = "/session/:sessionId/network_connection";

// ============================================================================
// NetworkConnectionType
// ============================================================================

/// Device network state, as a bitmask.
///
/// Bit 0 is airplane mode, bit 1 wifi, bit 2 data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NetworkConnectionType {
    /// No connectivity.
    None = 0,
    /// Airplane mode.
    AirplaneMode = 1,
    /// Wifi only.
    WifiOnly = 2,
    /// Mobile data only.
    DataOnly = 4,
    /// Wifi and mobile data.
    AllNetworkOn = 6,
}

impl NetworkConnectionType {
    /// Returns the wire value.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self as u64
    }

    /// Returns `true` if wifi is on.
    #[inline]
    #[must_use]
    pub const fn has_wifi(self) -> bool {
        self.bits() & 2 != 0
    }

    /// Returns `true` if mobile data is on.
    #[inline]
    #[must_use]
    pub const fn has_data(self) -> bool {
        self.bits() & 4 != 0
    }
}

impl TryFrom<u64> for NetworkConnectionType {
    type Error = Error;

    fn try_from(bits: u64) -> Result<Self> {
        match bits {
            0 => Ok(Self::None),
            1 => Ok(Self::AirplaneMode),
            2 => Ok(Self::WifiOnly),
            4 => Ok(Self::DataOnly),
            6 => Ok(Self::AllNetworkOn),
            other => Err(Error::protocol(format!(
                "Unknown network connection type: {other}"
            ))),
        }
    }
}

impl fmt::Display for NetworkConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::AirplaneMode => "airplane mode",
            Self::WifiOnly => "wifi only",
            Self::DataOnly => "data only",
            Self::AllNetworkOn => "all network on",
        };
        f.write_str(name)
    }
}

// ============================================================================
// MobileExtension
// ============================================================================

/// Mobile commands bound to a connection.
#[derive(Debug, Clone)]
pub struct MobileExtension {
    connection: Connection,
}

impl MobileExtension {
    /// Returns the command definitions this extension registers.
    #[must_use]
    pub fn definitions() -> [CommandDefinition; 2] {
        [
            CommandDefinition::new(GET_NETWORK_CONNECTION, Method::Get, NETWORK_CONNECTION_PATH),
            CommandDefinition::new(SET_NETWORK_CONNECTION, Method::Post, NETWORK_CONNECTION_PATH),
        ]
    }

    /// Defines the mobile commands on `connection`.
    ///
    /// Idempotent. The definitions also apply to sessions started later.
    #[must_use]
    pub fn register(connection: &Connection) -> Self {
        for definition in Self::definitions() {
            connection.define_command(definition);
        }
        debug!(connection = %connection.id(), "Mobile extension registered");

        Self {
            connection: connection.clone(),
        }
    }

    /// Returns the connection the commands were registered on.
    #[inline]
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Reads the device network state.
    ///
    /// # Errors
    ///
    /// - [`Error::NoConnection`] if no session is attached
    /// - [`Error::Protocol`] if the server answers with an unknown value
    pub async fn network_connection(&self) -> Result<NetworkConnectionType> {
        let value = self
            .connection
            .execute_custom(GET_NETWORK_CONNECTION, Value::Null)
            .await?;
        parse_network(&value)
    }

    /// Changes the device network state and returns the resulting state.
    ///
    /// # Errors
    ///
    /// - [`Error::NoConnection`] if no session is attached
    /// - [`Error::Protocol`] if the server answers with an unknown value
    pub async fn set_network_connection(
        &self,
        kind: NetworkConnectionType,
    ) -> Result<NetworkConnectionType> {
        debug!(%kind, "Setting network connection");
        let value = self
            .connection
            .execute_custom(
                SET_NETWORK_CONNECTION,
                json!({ "parameters": { "type": kind.bits() } }),
            )
            .await?;

        // Some drivers answer with null; assume the request took effect.
        if value.is_null() {
            return Ok(kind);
        }
        parse_network(&value)
    }
}

fn parse_network(value: &Value) -> Result<NetworkConnectionType> {
    value
        .as_u64()
        .ok_or_else(|| Error::protocol(format!("Expected network connection type, got {value}")))
        .and_then(NetworkConnectionType::try_from)
}

// ============================================================================
// Tests
// ============================================================================
