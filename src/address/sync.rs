//! Address synchronisation and pin code resolution.
//!
//! While `is_same_address` holds, the corporate address is a mirror of the
//! permanent one: every permanent edit is copied across in the same call and
//! corporate edits are refused. Locality fields are only ever written by a
//! pin code lookup.
//!
//! Lookups are fenced per slot. Each one takes a ticket carrying a
//! generation number; any later lookup or zip edit on the same slot bumps the
//! generation, and a response whose ticket is no longer current is dropped.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::application::{Address, AddressSlot, KycApplication};
use crate::backend::{KycBackend, PinLocality};
use crate::error::{TransportError, WizardError};

pub const PIN_FORMAT_ERROR: &str = "Invalid Pin Code format (6 digits required)";
pub const PIN_NOT_FOUND: &str = "Pincode not found";
pub const PIN_LOOKUP_FAILED: &str = "Failed to fetch address details";

const ZIP_LEN: usize = 6;

/// Fields of an [`Address`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    StreetAddress,
    City,
    State,
    ZipCode,
    Country,
}

impl AddressField {
    pub const ALL: [AddressField; 5] = [
        Self::StreetAddress,
        Self::City,
        Self::State,
        Self::ZipCode,
        Self::Country,
    ];

    /// Filled in from the zip code, never typed by the applicant.
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::City | Self::State | Self::Country)
    }

    /// camelCase key as used on the wire and in validation keys.
    pub fn key(&self) -> &'static str {
        match self {
            Self::StreetAddress => "streetAddress",
            Self::City => "city",
            Self::State => "state",
            Self::ZipCode => "zipCode",
            Self::Country => "country",
        }
    }

    pub fn get<'a>(&self, address: &'a Address) -> &'a str {
        match self {
            Self::StreetAddress => &address.street_address,
            Self::City => &address.city,
            Self::State => &address.state,
            Self::ZipCode => &address.zip_code,
            Self::Country => &address.country,
        }
    }
}

/// Claim on the result of one pin code lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub slot: AddressSlot,
    pub zip: String,
    generation: u64,
}

impl LookupTicket {
    /// Perform the lookup. Owns no engine state, so lookups on both slots
    /// can be awaited concurrently.
    pub async fn resolve(&self, backend: &dyn KycBackend) -> LookupOutcome {
        match backend.lookup_pin_code(&self.zip).await {
            Ok(Some(locality)) => LookupOutcome::Found(locality),
            Ok(None) => LookupOutcome::NotFound,
            Err(e) => LookupOutcome::Failed(e),
        }
    }
}

/// Raw result of a pin code lookup.
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    Found(PinLocality),
    NotFound,
    Failed(TransportError),
}

/// What applying a lookup outcome did to the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupResolution {
    Resolved,
    NotFound,
    Failed,
    /// A newer lookup or edit superseded this one; nothing changed.
    Stale,
}

/// Result of starting a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStart {
    Ticket(LookupTicket),
    /// The zip is not six digits; the format error has been recorded.
    InvalidFormat,
    /// The corporate slot mirrors the permanent one and has no lookup of
    /// its own.
    Mirrored,
}

/// Keeps the two address slots consistent and tracks lookup errors.
#[derive(Debug)]
pub struct AddressSyncEngine {
    generations: HashMap<AddressSlot, u64>,
    next_generation: u64,
    lookup_errors: HashMap<AddressSlot, String>,
    default_country: String,
}

impl AddressSyncEngine {
    pub fn new(default_country: impl Into<String>) -> Self {
        Self {
            generations: HashMap::new(),
            next_generation: 0,
            lookup_errors: HashMap::new(),
            default_country: default_country.into(),
        }
    }

    /// Error left by the latest lookup on `slot`, if any.
    pub fn lookup_error(&self, slot: AddressSlot) -> Option<&str> {
        self.lookup_errors.get(&slot).map(String::as_str)
    }

    /// Apply an applicant edit to one address field.
    ///
    /// Zip input keeps digits only, capped at six. Changing the zip
    /// invalidates any lookup in flight for the slot.
    pub fn edit(
        &mut self,
        app: &mut KycApplication,
        slot: AddressSlot,
        field: AddressField,
        value: &str,
    ) -> Result<(), WizardError> {
        if field.is_derived() {
            return Err(WizardError::FieldNotEditable {
                field: format!("{slot}_{}", field.key()),
            });
        }
        if slot == AddressSlot::Corporate && app.is_same_address {
            return Err(WizardError::FieldNotEditable {
                field: format!("{slot}_{}", field.key()),
            });
        }

        let address = app.address_mut(slot);
        match field {
            AddressField::StreetAddress => address.street_address = value.to_string(),
            AddressField::ZipCode => {
                let zip: String = value
                    .chars()
                    .filter(char::is_ascii_digit)
                    .take(ZIP_LEN)
                    .collect();
                if zip != address.zip_code {
                    address.zip_code = zip;
                    self.fence(slot);
                    self.lookup_errors.remove(&slot);
                }
            }
            AddressField::City | AddressField::State | AddressField::Country => {}
        }

        self.mirror(app, slot);
        Ok(())
    }

    /// Toggle the same-address flag.
    ///
    /// Turning it on copies the permanent address (and its lookup error)
    /// into the corporate slot. Turning it off empties the corporate slot and
    /// forgets its lookup error. Either way, corporate lookups in flight are
    /// dropped.
    pub fn set_same_address(&mut self, app: &mut KycApplication, same: bool) {
        if app.is_same_address == same {
            return;
        }
        app.is_same_address = same;
        self.fence(AddressSlot::Corporate);

        if same {
            app.corporate_address = app.permanent_address.clone();
            match self.lookup_errors.get(&AddressSlot::Permanent).cloned() {
                Some(err) => self.lookup_errors.insert(AddressSlot::Corporate, err),
                None => self.lookup_errors.remove(&AddressSlot::Corporate),
            };
        } else {
            app.corporate_address = Address::default();
            self.lookup_errors.remove(&AddressSlot::Corporate);
        }
        debug!(same, "Same-address flag changed");
    }

    /// Start a lookup for the slot's current zip code.
    pub fn begin_lookup(&mut self, app: &KycApplication, slot: AddressSlot) -> LookupStart {
        if slot == AddressSlot::Corporate && app.is_same_address {
            debug!("Corporate lookup refused while addresses are synced");
            return LookupStart::Mirrored;
        }
        let zip = app.address(slot).zip_code.clone();
        if !is_valid_zip(&zip) {
            self.lookup_errors.insert(slot, PIN_FORMAT_ERROR.to_string());
            return LookupStart::InvalidFormat;
        }
        self.lookup_errors.remove(&slot);
        let generation = self.fence(slot);
        LookupStart::Ticket(LookupTicket {
            slot,
            zip,
            generation,
        })
    }

    /// Apply a lookup outcome if its ticket is still current for the slot.
    pub fn apply_lookup(
        &mut self,
        app: &mut KycApplication,
        ticket: &LookupTicket,
        outcome: LookupOutcome,
    ) -> LookupResolution {
        let slot = ticket.slot;
        if self.generations.get(&slot) != Some(&ticket.generation) {
            debug!(%slot, zip = %ticket.zip, "Dropping stale pin code response");
            return LookupResolution::Stale;
        }
        if slot == AddressSlot::Corporate && app.is_same_address {
            debug!(zip = %ticket.zip, "Dropping corporate pin code response while synced");
            return LookupResolution::Stale;
        }

        let resolution = match outcome {
            LookupOutcome::Found(locality) => {
                let address = app.address_mut(slot);
                address.city = title_case(&locality.district);
                address.state = title_case(&locality.state);
                address.country = self.default_country.clone();
                self.lookup_errors.remove(&slot);
                info!(%slot, zip = %ticket.zip, city = %address.city, "Pin code resolved");
                LookupResolution::Resolved
            }
            LookupOutcome::NotFound => {
                app.address_mut(slot).clear_locality();
                self.lookup_errors.insert(slot, PIN_NOT_FOUND.to_string());
                info!(%slot, zip = %ticket.zip, "Pin code not found");
                LookupResolution::NotFound
            }
            LookupOutcome::Failed(e) => {
                self.lookup_errors
                    .insert(slot, PIN_LOOKUP_FAILED.to_string());
                warn!(%slot, zip = %ticket.zip, error = %e, "Pin code lookup failed");
                LookupResolution::Failed
            }
        };

        self.mirror(app, slot);
        resolution
    }

    /// Begin, resolve and apply a lookup in one go.
    pub async fn lookup(
        &mut self,
        app: &mut KycApplication,
        slot: AddressSlot,
        backend: &dyn KycBackend,
    ) -> Option<LookupResolution> {
        let LookupStart::Ticket(ticket) = self.begin_lookup(app, slot) else {
            return None;
        };
        let outcome = ticket.resolve(backend).await;
        Some(self.apply_lookup(app, &ticket, outcome))
    }

    /// Mark every outstanding lookup on `slot` stale, returning the new
    /// current generation.
    fn fence(&mut self, slot: AddressSlot) -> u64 {
        self.next_generation += 1;
        self.generations.insert(slot, self.next_generation);
        self.next_generation
    }

    fn mirror(&mut self, app: &mut KycApplication, slot: AddressSlot) {
        if slot != AddressSlot::Permanent || !app.is_same_address {
            return;
        }
        app.corporate_address = app.permanent_address.clone();
        match self.lookup_errors.get(&AddressSlot::Permanent).cloned() {
            Some(err) => self.lookup_errors.insert(AddressSlot::Corporate, err),
            None => self.lookup_errors.remove(&AddressSlot::Corporate),
        };
    }
}

pub fn is_valid_zip(zip: &str) -> bool {
    zip.len() == ZIP_LEN && zip.bytes().all(|b| b.is_ascii_digit())
}

/// Lowercase, then capitalise the first letter of every word.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut at_word_start = true;
    for ch in raw.trim().chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}
