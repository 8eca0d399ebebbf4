use std::{collections::BTreeMap, fmt};

use serde::Serialize;

use super::InputError;

/// Named inputs of the manual-entry form, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ManualField {
    KoiFpflagSs,
    KoiFpflagNt,
    KoiFpflagCo,
    KoiDuration,
    KoiTime0bk,
    KoiFpflagEc,
    Ra,
    /// Only read by the heuristic scorer; never sent to the endpoint.
    KoiCount,
}

/// How a field value is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Float,
}

impl ManualField {
    /// Fields the prediction endpoint expects.
    pub const REMOTE: [ManualField; 7] = [
        ManualField::KoiFpflagSs,
        ManualField::KoiFpflagNt,
        ManualField::KoiFpflagCo,
        ManualField::KoiDuration,
        ManualField::KoiTime0bk,
        ManualField::KoiFpflagEc,
        ManualField::Ra,
    ];

    /// Fields the heuristic scorer expects.
    pub const HEURISTIC: [ManualField; 8] = [
        ManualField::KoiFpflagSs,
        ManualField::KoiFpflagNt,
        ManualField::KoiFpflagCo,
        ManualField::KoiDuration,
        ManualField::KoiTime0bk,
        ManualField::KoiFpflagEc,
        ManualField::Ra,
        ManualField::KoiCount,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::KoiFpflagSs => "koi_fpflag_ss",
            Self::KoiFpflagNt => "koi_fpflag_nt",
            Self::KoiFpflagCo => "koi_fpflag_co",
            Self::KoiDuration => "koi_duration",
            Self::KoiTime0bk => "koi_time0bk",
            Self::KoiFpflagEc => "koi_fpflag_ec",
            Self::Ra => "ra",
            Self::KoiCount => "koi_count",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Self::KoiDuration | Self::KoiTime0bk | Self::Ra => FieldKind::Float,
            _ => FieldKind::Integer,
        }
    }
}

impl fmt::Display for ManualField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw text of the manual-entry form as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualEntry {
    values: BTreeMap<ManualField, String>,
}

impl ManualEntry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: ManualField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: ManualField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Current text of `field`; absent fields read as empty.
    pub fn get(&self, field: ManualField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }
}

/// Type-coerced manual input. Serializes to the endpoint's request fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManualRecord {
    pub koi_fpflag_ss: i64,
    pub koi_fpflag_nt: i64,
    pub koi_fpflag_co: i64,
    pub koi_duration: f64,
    pub koi_time0bk: f64,
    pub koi_fpflag_ec: i64,
    pub ra: f64,
    #[serde(skip)]
    pub koi_count: Option<i64>,
}

/// Check that every field in `required` is filled and coerce the form into a record.
///
/// The first empty field (in `required` order) is reported. `koi_count` is
/// only read when `required` names it; otherwise it stays `None`.
pub fn validate_manual_fields(
    entry: &ManualEntry,
    required: &[ManualField],
) -> Result<ManualRecord, InputError> {
    if let Some(field) = required
        .iter()
        .copied()
        .find(|field| entry.get(*field).trim().is_empty())
    {
        return Err(InputError::MissingField { field });
    }

    Ok(ManualRecord {
        koi_fpflag_ss: parse_int(entry, ManualField::KoiFpflagSs)?,
        koi_fpflag_nt: parse_int(entry, ManualField::KoiFpflagNt)?,
        koi_fpflag_co: parse_int(entry, ManualField::KoiFpflagCo)?,
        koi_duration: parse_float(entry, ManualField::KoiDuration)?,
        koi_time0bk: parse_float(entry, ManualField::KoiTime0bk)?,
        koi_fpflag_ec: parse_int(entry, ManualField::KoiFpflagEc)?,
        ra: parse_float(entry, ManualField::Ra)?,
        koi_count: if required.contains(&ManualField::KoiCount) {
            Some(parse_int(entry, ManualField::KoiCount)?)
        } else {
            None
        },
    })
}

fn parse_int(entry: &ManualEntry, field: ManualField) -> Result<i64, InputError> {
    let raw = entry.get(field).trim();
    raw.parse::<i64>().map_err(|_| InputError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

fn parse_float(entry: &ManualEntry, field: ManualField) -> Result<f64, InputError> {
    let raw = entry.get(field).trim();
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InputError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}
