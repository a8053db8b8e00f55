//! Search option types for the KLADR API.
//!
//! The API recognizes a fixed set of options per search mode; the two
//! structs below enumerate them with concrete types, so options the API
//! does not know are simply unrepresentable. What the type system cannot
//! check up front (the legal settlement-code combinations, the required
//! content type of a field-scoped search) is validated when the options
//! are resolved into wire parameters.

use crate::error::{Error, Result};

/// Decoded API response body.
///
/// The API has no fixed response schema; results come back as arbitrarily
/// nested JSON with key order preserved.
pub type ApiResult = serde_json::Value;

/// Address field targeted by a field-scoped search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// Region
    Region,
    /// District
    District,
    /// Locality
    City,
    /// Street
    Street,
    /// Building
    Building,
}

impl ContentType {
    /// Wire name of the field, as the API expects it.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentType::Region => "region",
            ContentType::District => "district",
            ContentType::City => "city",
            ContentType::Street => "street",
            ContentType::Building => "building",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settlement-kind filter for field-scoped searches.
///
/// A bitmask over the three kinds the API distinguishes, composed with `|`:
///
/// ```rust
/// use kladr_client::TypeCode;
///
/// let anything_rural = TypeCode::VILLAGE | TypeCode::RURAL;
/// assert_eq!(anything_rural.bits(), 6);
/// ```
///
/// Raw codes from stored data convert via `From<u8>` and are checked
/// against the legal combinations when the search options are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeCode(u8);

impl TypeCode {
    /// City
    pub const CITY: TypeCode = TypeCode(1);
    /// Village
    pub const VILLAGE: TypeCode = TypeCode(2);
    /// Rural settlement
    pub const RURAL: TypeCode = TypeCode(4);

    /// Raw bit value transmitted to the API.
    pub fn bits(self) -> u8 {
        self.0
    }

    fn is_valid(self) -> bool {
        self.0 != 0 && self.0 <= (Self::CITY.0 | Self::VILLAGE.0 | Self::RURAL.0)
    }
}

impl std::ops::BitOr for TypeCode {
    type Output = TypeCode;

    fn bitor(self, rhs: TypeCode) -> TypeCode {
        TypeCode(self.0 | rhs.0)
    }
}

impl From<u8> for TypeCode {
    fn from(bits: u8) -> Self {
        TypeCode(bits)
    }
}

/// `withParent` option value.
///
/// The API accepts the option as a boolean flag or a bare integer and
/// always receives the integer form 0/1 on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithParent {
    /// Supplied as a flag.
    Flag(bool),
    /// Supplied as an integer; any nonzero value enables the option.
    Numeric(i64),
}

impl WithParent {
    pub(crate) fn to_wire(self) -> i64 {
        match self {
            WithParent::Flag(flag) => i64::from(flag),
            WithParent::Numeric(n) => i64::from(n != 0),
        }
    }
}

impl From<bool> for WithParent {
    fn from(flag: bool) -> Self {
        WithParent::Flag(flag)
    }
}

impl From<i64> for WithParent {
    fn from(n: i64) -> Self {
        WithParent::Numeric(n)
    }
}

/// Postal code, accepted as an integer or a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Zip {
    Numeric(u64),
    Text(String),
}

impl Zip {
    pub(crate) fn to_wire(&self) -> String {
        match self {
            Zip::Numeric(code) => code.to_string(),
            Zip::Text(text) => text.clone(),
        }
    }
}

impl From<u64> for Zip {
    fn from(code: u64) -> Self {
        Zip::Numeric(code)
    }
}

impl From<&str> for Zip {
    fn from(text: &str) -> Self {
        Zip::Text(text.to_owned())
    }
}

impl From<String> for Zip {
    fn from(text: String) -> Self {
        Zip::Text(text)
    }
}

/// Options for a free-text search across the whole address string.
#[derive(Debug, Clone, Default)]
pub struct StringSearchParams {
    /// Include the parent objects of each match in the response.
    pub with_parent: Option<WithParent>,
    /// Restrict matches to one region by its KLADR id.
    pub region_id: Option<String>,
    /// Restrict matches to one district by its KLADR id.
    pub district_id: Option<String>,
    /// Restrict matches to one locality by its KLADR id.
    pub city_id: Option<String>,
    /// Restrict matches to one address field.
    pub content_type: Option<ContentType>,
}

impl StringSearchParams {
    /// Resolve the options into wire parameters.
    ///
    /// Appends `oneString = 1`, which tells the API to match against the
    /// concatenated address string instead of individual fields.
    pub(crate) fn resolve(&self) -> Result<Vec<(&'static str, String)>> {
        let mut params = Vec::new();

        if let Some(with_parent) = self.with_parent {
            params.push(("withParent", with_parent.to_wire().to_string()));
        }
        if let Some(region_id) = &self.region_id {
            params.push(("regionId", region_id.clone()));
        }
        if let Some(district_id) = &self.district_id {
            params.push(("districtId", district_id.clone()));
        }
        if let Some(city_id) = &self.city_id {
            params.push(("cityId", city_id.clone()));
        }
        if let Some(content_type) = self.content_type {
            params.push(("contentType", content_type.as_str().to_owned()));
        }

        params.push(("oneString", "1".to_owned()));

        Ok(params)
    }
}

/// Options for a search scoped to a single address field.
#[derive(Debug, Clone, Default)]
pub struct FieldSearchParams {
    /// Include the parent objects of each match in the response.
    pub with_parent: Option<WithParent>,
    /// Restrict matches to one region by its KLADR id.
    pub region_id: Option<String>,
    /// Restrict matches to one district by its KLADR id.
    pub district_id: Option<String>,
    /// Restrict matches to one locality by its KLADR id.
    pub city_id: Option<String>,
    /// Restrict matches to one street by its KLADR id.
    pub street_id: Option<String>,
    /// Restrict matches to one building by its KLADR id.
    pub building_id: Option<String>,
    /// Match buildings by postal code. Setting this forces the search to
    /// target buildings whatever `content_type` says.
    pub zip: Option<Zip>,
    /// Restrict matches to certain settlement kinds.
    pub type_code: Option<TypeCode>,
    /// The address field to search. Required unless `zip` is set.
    pub content_type: Option<ContentType>,
}

impl FieldSearchParams {
    /// Resolve the options into wire parameters.
    pub(crate) fn resolve(&self) -> Result<Vec<(&'static str, String)>> {
        // Zip search only works against buildings, so a supplied zip
        // overrides the declared content type before any check runs.
        let content_type = if self.zip.is_some() {
            Some(ContentType::Building)
        } else {
            self.content_type
        };

        let content_type = content_type.ok_or(Error::Validation {
            key: "contentType",
            reason: "required for a field-scoped search".to_owned(),
        })?;

        if let Some(type_code) = self.type_code {
            if !type_code.is_valid() {
                return Err(Error::Validation {
                    key: "typeCode",
                    reason: format!(
                        "{} is not a combination of the city (1), village (2) and rural (4) codes",
                        type_code.bits()
                    ),
                });
            }
        }

        let mut params = Vec::new();

        if let Some(with_parent) = self.with_parent {
            params.push(("withParent", with_parent.to_wire().to_string()));
        }
        if let Some(region_id) = &self.region_id {
            params.push(("regionId", region_id.clone()));
        }
        if let Some(district_id) = &self.district_id {
            params.push(("districtId", district_id.clone()));
        }
        if let Some(city_id) = &self.city_id {
            params.push(("cityId", city_id.clone()));
        }
        if let Some(street_id) = &self.street_id {
            params.push(("streetId", street_id.clone()));
        }
        if let Some(building_id) = &self.building_id {
            params.push(("buildingId", building_id.clone()));
        }
        if let Some(zip) = &self.zip {
            params.push(("zip", zip.to_wire()));
        }
        if let Some(type_code) = self.type_code {
            params.push(("typeCode", type_code.bits().to_string()));
        }
        params.push(("contentType", content_type.as_str().to_owned()));

        Ok(params)
    }
}
