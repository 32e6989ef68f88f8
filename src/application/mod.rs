//! Application record: the data the wizard collects and persists.

pub mod model;
pub mod slices;

pub use model::{
    Address, AddressSlot, DocumentRecord, Gender, KycApplication, KycStatus, LivenessRecord,
    OvdType,
};
pub use slices::{AddressSlice, DocumentsSlice, LivenessSlice, PersonalSlice, normalize_dob, parse_dob};
