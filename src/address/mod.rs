//! Address synchronisation between the permanent and current addresses.

pub mod sync;

pub use sync::{
    AddressField, AddressSyncEngine, LookupOutcome, LookupResolution, LookupStart, LookupTicket,
    PIN_FORMAT_ERROR, PIN_LOOKUP_FAILED, PIN_NOT_FOUND, is_valid_zip, title_case,
};
