use crate::query::key::{self, Key};

///
/// FieldRef
///
/// Zero-cost wrapper around a static field name.
/// Enables method-based key construction without going through the
/// registry by symbol: `FieldRef::new("age").gt()`.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct FieldRef(&'static str);

impl FieldRef {
    /// Create a new field reference.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Return the underlying field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    /// Bind a registered template by symbol.
    #[must_use]
    pub fn key(self, symbol: &str) -> Option<Key> {
        Key::lookup(self.0, symbol)
    }

    // ------------------------------------------------------------------
    // Comparison
    // ------------------------------------------------------------------

    #[must_use]
    pub fn eq(self) -> Key {
        Key::new(self.0, &key::EQ)
    }

    #[must_use]
    pub fn ne(self) -> Key {
        Key::new(self.0, &key::NE)
    }

    #[must_use]
    pub fn gt(self) -> Key {
        Key::new(self.0, &key::GT)
    }

    #[must_use]
    pub fn gte(self) -> Key {
        Key::new(self.0, &key::GTE)
    }

    #[must_use]
    pub fn lt(self) -> Key {
        Key::new(self.0, &key::LT)
    }

    #[must_use]
    pub fn lte(self) -> Key {
        Key::new(self.0, &key::LTE)
    }

    #[must_use]
    pub fn mod_(self) -> Key {
        Key::new(self.0, &key::MOD)
    }

    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(self) -> Key {
        Key::new(self.0, &key::NOT)
    }

    // ------------------------------------------------------------------
    // Membership and structure
    // ------------------------------------------------------------------

    #[must_use]
    pub fn in_(self) -> Key {
        Key::new(self.0, &key::IN)
    }

    #[must_use]
    pub fn nin(self) -> Key {
        Key::new(self.0, &key::NIN)
    }

    #[must_use]
    pub fn all(self) -> Key {
        Key::new(self.0, &key::ALL)
    }

    #[must_use]
    pub fn elem_match(self) -> Key {
        Key::new(self.0, &key::ELEM_MATCH)
    }

    /// `$exists`; truthy strings and 0/1 are coerced to booleans.
    #[must_use]
    pub fn exists(self) -> Key {
        Key::new(self.0, &key::EXISTS)
    }

    /// `$size`; numeric strings are coerced to integers.
    #[must_use]
    pub fn with_size(self) -> Key {
        Key::new(self.0, &key::WITH_SIZE)
    }

    /// `$type`; numeric strings are coerced to integers.
    #[must_use]
    pub fn with_type(self) -> Key {
        Key::new(self.0, &key::WITH_TYPE)
    }

    // ------------------------------------------------------------------
    // Geo
    // ------------------------------------------------------------------

    #[must_use]
    pub fn near(self) -> Key {
        Key::new(self.0, &key::NEAR)
    }

    #[must_use]
    pub fn near_sphere(self) -> Key {
        Key::new(self.0, &key::NEAR_SPHERE)
    }

    #[must_use]
    pub fn intersects_line(self) -> Key {
        Key::new(self.0, &key::INTERSECTS_LINE)
    }

    #[must_use]
    pub fn intersects_point(self) -> Key {
        Key::new(self.0, &key::INTERSECTS_POINT)
    }

    #[must_use]
    pub fn intersects_polygon(self) -> Key {
        Key::new(self.0, &key::INTERSECTS_POLYGON)
    }

    #[must_use]
    pub fn within_polygon(self) -> Key {
        Key::new(self.0, &key::WITHIN_POLYGON)
    }

    #[must_use]
    pub fn within_box(self) -> Key {
        Key::new(self.0, &key::WITHIN_BOX)
    }

    // ------------------------------------------------------------------
    // Sorting
    // ------------------------------------------------------------------

    #[must_use]
    pub fn asc(self) -> Key {
        Key::new(self.0, &key::ASC)
    }

    #[must_use]
    pub fn desc(self) -> Key {
        Key::new(self.0, &key::DESC)
    }
}

// ----------------------------------------------------------------------
// Boundary traits
// ----------------------------------------------------------------------

impl AsRef<str> for FieldRef {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl std::ops::Deref for FieldRef {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}
