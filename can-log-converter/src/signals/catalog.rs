//! The DBC message catalog
//!
//! Combines message definitions from multiple DBC files into a single
//! queryable catalog. The catalog is built once per run and read-only
//! afterwards; per-run bookkeeping (match counters, pulse flags) lives in
//! the row assembler so a loaded catalog can serve several conversions.

use std::collections::HashMap;

/// A complete CAN message definition
#[derive(Debug, Clone)]
pub struct MessageDefinition {
    /// CAN message ID (masked to 29 bits when declared with bit 31 set)
    pub id: u32,
    /// True if the declared ID is an extended (29-bit) identifier
    pub extended: bool,
    /// Message name
    pub name: String,
    /// Declared data length code
    pub dlc: u8,
    /// Signals keyed by name; a later signal with the same name replaces
    /// the earlier one
    pub signals: HashMap<String, SignalDefinition>,
}

/// A CAN signal definition
#[derive(Debug, Clone)]
pub struct SignalDefinition {
    /// Signal name
    pub name: String,
    /// Start bit in the declared byte order's numbering
    pub start_bit: u16,
    /// Length in bits
    pub size: u16,
    /// Byte order (Intel or Motorola)
    pub byte_order: ByteOrder,
    /// Value type (signed/unsigned)
    pub value_type: ValueType,
    /// Scale factor to convert raw value to physical value
    pub factor: f64,
    /// Offset to add after scaling
    pub offset: f64,
    /// Minimum physical value (informational, never enforced)
    pub min: f64,
    /// Maximum physical value (informational, never enforced)
    pub max: f64,
    /// Engineering unit (e.g., "km/h", "V")
    pub unit: Option<String>,
}

/// Byte order for signal extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian (Intel format)
    LittleEndian,
    /// Big-endian (Motorola format)
    BigEndian,
}

/// Value type for signal interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    /// Signed integer
    Signed,
    /// Unsigned integer
    Unsigned,
}

impl SignalDefinition {
    /// Bit offset of the signal's least significant bit within the
    /// zero-padded 64-bit payload window.
    ///
    /// Little-endian start bits address that bit directly. Motorola start
    /// bits address the signal's most significant bit, so the least
    /// significant bit sits `size - 1` positions below it within the byte
    /// numbering. The result can be negative for Motorola descriptors whose
    /// declared width runs past their start byte.
    pub fn window_offset(&self) -> i64 {
        match self.byte_order {
            ByteOrder::LittleEndian => i64::from(self.start_bit),
            ByteOrder::BigEndian => {
                let byte = i64::from(self.start_bit / 8);
                let bit = i64::from(self.start_bit % 8);
                byte * 8 + bit - i64::from(self.size) + 1
            }
        }
    }

    /// True when the signal lies entirely inside the 64-bit payload window
    pub fn fits_window(&self) -> bool {
        if self.size < 1 || self.size > 64 {
            return false;
        }
        let offset = self.window_offset();
        offset >= 0 && offset + i64::from(self.size) <= 64
    }
}

/// The message catalog, keyed by CAN ID
pub struct DbcCatalog {
    /// Message definitions by CAN ID; one definition per ID, last one loaded
    /// wins
    messages: HashMap<u32, MessageDefinition>,
}

impl DbcCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self {
            messages: HashMap::new(),
        }
    }

    /// Add message definitions to the catalog
    ///
    /// Definitions are folded in the order given: when several files (or one
    /// file twice) declare the same CAN ID, the definition loaded last
    /// replaces the earlier one entirely. Signals are never merged across
    /// definitions.
    pub fn add_messages(&mut self, messages: Vec<MessageDefinition>) {
        for message in messages {
            if let Some(previous) = self.messages.insert(message.id, message) {
                log::debug!(
                    "Message ID 0x{:X} redefined, dropping earlier definition '{}'",
                    previous.id,
                    previous.name
                );
            }
        }
    }

    /// Get the message definition for a CAN ID
    pub fn message(&self, can_id: u32) -> Option<&MessageDefinition> {
        self.messages.get(&can_id)
    }

    /// Iterate over all message definitions (unspecified order)
    pub fn messages(&self) -> impl Iterator<Item = &MessageDefinition> {
        self.messages.values()
    }

    /// True when no definitions have been loaded
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Get catalog statistics
    pub fn stats(&self) -> CatalogStats {
        CatalogStats {
            messages: self.messages.len(),
            signals: self.messages.values().map(|m| m.signals.len()).sum(),
        }
    }
}

impl Default for DbcCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Catalog statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    /// Total number of message definitions
    pub messages: usize,
    /// Total number of signal definitions
    pub signals: usize,
}
