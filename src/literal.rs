//! Typed literal values and their ordering/equality rules
//!
//! A `Literal` is the value carried in one row slot: URI, blank node,
//! plain/typed string, numeric, date/time, or one of the structural kinds
//! (variable reference, pattern, qname, user-defined type). Numeric kinds
//! form a promotion lattice (boolean < integer < float < double < decimal);
//! comparing two numeric literals promotes both operands to the least
//! common ancestor kind before comparing.

use crate::var_registry::VarId;
use bigdecimal::{BigDecimal, ToPrimitive};
use chrono::{DateTime, FixedOffset, NaiveDate};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Well-known datatype URIs
pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const DATE: &str = "http://www.w3.org/2001/XMLSchema#date";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

/// Comparison flags threaded through DISTINCT's dedup map and MINUS's
/// equality checks
///
/// `case_insensitive` applies to plain/typed string values (language tags
/// are always compared case-insensitively); `promote_numerics` enables
/// cross-kind numeric comparison via the promotion lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompareConfig {
    pub case_insensitive: bool,
    pub promote_numerics: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            promote_numerics: true,
        }
    }
}

/// A typed literal value
///
/// Immutable once constructed; `Clone` is cheap (string payloads are
/// `Arc<str>`, large numeric payloads are boxed to keep the enum small).
/// String values carry their own length (`Arc<str>`), so embedded data is
/// fine and no NUL-termination is assumed.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// URI reference
    Uri(Arc<str>),
    /// Blank node label
    BlankNode(Arc<str>),
    /// Plain or typed string with optional language tag
    String {
        value: Arc<str>,
        language: Option<Arc<str>>,
        datatype: Option<Arc<str>>,
    },
    /// xsd:boolean
    Boolean(bool),
    /// xsd:integer
    Integer(i64),
    /// An XSD integer subtype (xsd:byte, xsd:short, xsd:nonNegativeInteger, ...)
    /// carrying its exact datatype URI
    IntegerSubtype { value: i64, datatype: Arc<str> },
    /// xsd:float
    Float(f32),
    /// xsd:double
    Double(f64),
    /// xsd:decimal (boxed to keep the enum small)
    Decimal(Box<BigDecimal>),
    /// xsd:date
    Date(NaiveDate),
    /// xsd:dateTime with timezone
    DateTime(DateTime<FixedOffset>),
    /// Reference to a variable whose current value lives in the binding
    /// environment; the only kind whose *referenced* value may change
    Variable(VarId),
    /// Regex pattern (RDQL REGEX operand)
    Pattern {
        value: Arc<str>,
        flags: Option<Arc<str>>,
    },
    /// Unexpanded prefixed name
    QName(Arc<str>),
    /// Value of a user-defined datatype, kept as its lexical form
    Udt { value: Arc<str>, datatype: Arc<str> },
}

impl Literal {
    pub fn uri(value: &str) -> Self {
        Literal::Uri(Arc::from(value))
    }

    pub fn blank(label: &str) -> Self {
        Literal::BlankNode(Arc::from(label))
    }

    pub fn string(value: &str) -> Self {
        Literal::String {
            value: Arc::from(value),
            language: None,
            datatype: None,
        }
    }

    pub fn lang_string(value: &str, language: &str) -> Self {
        Literal::String {
            value: Arc::from(value),
            language: Some(Arc::from(language)),
            datatype: None,
        }
    }

    pub fn typed_string(value: &str, datatype: &str) -> Self {
        Literal::String {
            value: Arc::from(value),
            language: None,
            datatype: Some(Arc::from(datatype)),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Literal::Boolean(value)
    }

    pub fn integer(value: i64) -> Self {
        Literal::Integer(value)
    }

    pub fn integer_subtype(value: i64, datatype: &str) -> Self {
        Literal::IntegerSubtype {
            value,
            datatype: Arc::from(datatype),
        }
    }

    pub fn float(value: f32) -> Self {
        Literal::Float(value)
    }

    pub fn double(value: f64) -> Self {
        Literal::Double(value)
    }

    pub fn decimal(value: BigDecimal) -> Self {
        Literal::Decimal(Box::new(value))
    }

    pub fn udt(value: &str, datatype: &str) -> Self {
        Literal::Udt {
            value: Arc::from(value),
            datatype: Arc::from(datatype),
        }
    }

    /// Datatype URI implied by the kind (explicit datatype wins for string,
    /// integer-subtype and user-defined kinds); `None` for kinds that have
    /// no datatype (URI, blank node, variable, pattern, qname)
    pub fn datatype_uri(&self) -> Option<&str> {
        match self {
            Literal::String {
                datatype, language, ..
            } => match datatype {
                Some(dt) => Some(dt.as_ref()),
                None if language.is_some() => Some(xsd::LANG_STRING),
                None => Some(xsd::STRING),
            },
            Literal::Boolean(_) => Some(xsd::BOOLEAN),
            Literal::Integer(_) => Some(xsd::INTEGER),
            Literal::IntegerSubtype { datatype, .. } => Some(datatype.as_ref()),
            Literal::Float(_) => Some(xsd::FLOAT),
            Literal::Double(_) => Some(xsd::DOUBLE),
            Literal::Decimal(_) => Some(xsd::DECIMAL),
            Literal::Date(_) => Some(xsd::DATE),
            Literal::DateTime(_) => Some(xsd::DATE_TIME),
            Literal::Udt { datatype, .. } => Some(datatype.as_ref()),
            Literal::Uri(_)
            | Literal::BlankNode(_)
            | Literal::Variable(_)
            | Literal::Pattern { .. }
            | Literal::QName(_) => None,
        }
    }

    /// Position of this literal in the numeric promotion lattice, or `None`
    /// for non-numeric kinds
    pub fn numeric_kind(&self) -> Option<NumericKind> {
        match self {
            Literal::Boolean(_) => Some(NumericKind::Boolean),
            Literal::Integer(_) | Literal::IntegerSubtype { .. } => Some(NumericKind::Integer),
            Literal::Float(_) => Some(NumericKind::Float),
            Literal::Double(_) => Some(NumericKind::Double),
            Literal::Decimal(_) => Some(NumericKind::Decimal),
            _ => None,
        }
    }

    /// Whether the literal is in the numeric promotion lattice
    pub fn is_numeric(&self) -> bool {
        self.numeric_kind().is_some()
    }
}

/// Numeric promotion lattice: boolean < integer < float < double < decimal
///
/// Comparing or combining two numeric kinds promotes both operands to the
/// least common ancestor, which for a total chain is simply the maximum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum NumericKind {
    Boolean,
    Integer,
    Float,
    Double,
    Decimal,
}

impl NumericKind {
    /// Least common ancestor of two kinds in the lattice
    pub fn promote(a: NumericKind, b: NumericKind) -> NumericKind {
        a.max(b)
    }
}

pub(crate) fn as_i64(lit: &Literal) -> Option<i64> {
    match lit {
        Literal::Boolean(b) => Some(i64::from(*b)),
        Literal::Integer(v) | Literal::IntegerSubtype { value: v, .. } => Some(*v),
        _ => None,
    }
}

pub(crate) fn as_f64(lit: &Literal) -> Option<f64> {
    match lit {
        Literal::Boolean(b) => Some(f64::from(u8::from(*b))),
        Literal::Integer(v) | Literal::IntegerSubtype { value: v, .. } => {
            // Rounds above 2^53; comparison routes such operands through
            // the exact decimal path instead of this conversion
            #[allow(clippy::cast_precision_loss)]
            Some(*v as f64)
        }
        Literal::Float(v) => Some(f64::from(*v)),
        Literal::Double(v) => Some(*v),
        Literal::Decimal(d) => Some(d.to_f64().unwrap_or(f64::NAN)),
        _ => None,
    }
}

pub(crate) fn as_decimal(lit: &Literal) -> Option<BigDecimal> {
    match lit {
        Literal::Boolean(b) => Some(BigDecimal::from(i64::from(*b))),
        Literal::Integer(v) | Literal::IntegerSubtype { value: v, .. } => {
            Some(BigDecimal::from(*v))
        }
        Literal::Float(v) => BigDecimal::try_from(f64::from(*v)).ok(),
        Literal::Double(v) => BigDecimal::try_from(*v).ok(),
        Literal::Decimal(d) => Some(d.as_ref().clone()),
        _ => None,
    }
}

/// f64 comparison with NaN ordered last
fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| {
        if a.is_nan() && b.is_nan() {
            Ordering::Equal
        } else if a.is_nan() {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    })
}

/// Whether an i64 survives the round trip through f64 without rounding
fn i64_fits_f64(v: i64) -> bool {
    const EXACT: i64 = 1 << f64::MANTISSA_DIGITS;
    (-EXACT..=EXACT).contains(&v)
}

/// An integer operand too large for the f64 mantissa must not be compared
/// in the float domain: nearby distinct values collapse there, breaking
/// the total order
fn needs_exact_compare(lit: &Literal) -> bool {
    matches!(
        lit,
        Literal::Integer(v) | Literal::IntegerSubtype { value: v, .. } if !i64_fits_f64(*v)
    )
}

/// Compare two numeric literals after promoting both to their least common
/// ancestor kind; `None` when either operand is non-numeric
fn compare_numeric(a: &Literal, b: &Literal) -> Option<Ordering> {
    let ka = a.numeric_kind()?;
    let kb = b.numeric_kind()?;
    let ord = match NumericKind::promote(ka, kb) {
        NumericKind::Boolean | NumericKind::Integer => as_i64(a)?.cmp(&as_i64(b)?),
        NumericKind::Float | NumericKind::Double => {
            if needs_exact_compare(a) || needs_exact_compare(b) {
                compare_exact(a, b)?
            } else {
                cmp_f64(as_f64(a)?, as_f64(b)?)
            }
        }
        NumericKind::Decimal => compare_exact(a, b)?,
    };
    Some(ord)
}

/// Exact comparison through the decimal domain; NaN and the infinities
/// have no decimal representation and fall back to float ordering
fn compare_exact(a: &Literal, b: &Literal) -> Option<Ordering> {
    match (as_decimal(a), as_decimal(b)) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => Some(cmp_f64(as_f64(a)?, as_f64(b)?)),
    }
}

/// Kind-class rank used for the total order across literal kinds
fn class_rank(lit: &Literal) -> u8 {
    match lit {
        Literal::Uri(_) => 0,
        Literal::BlankNode(_) => 1,
        Literal::String { .. } => 2,
        Literal::Boolean(_)
        | Literal::Integer(_)
        | Literal::IntegerSubtype { .. }
        | Literal::Float(_)
        | Literal::Double(_)
        | Literal::Decimal(_) => 3,
        Literal::Date(_) => 4,
        Literal::DateTime(_) => 5,
        Literal::Pattern { .. } => 6,
        Literal::QName(_) => 7,
        Literal::Udt { .. } => 8,
        Literal::Variable(_) => 9,
    }
}

fn cmp_str(a: &str, b: &str, case_insensitive: bool) -> Ordering {
    if case_insensitive {
        a.to_lowercase().cmp(&b.to_lowercase())
    } else {
        a.cmp(b)
    }
}

fn cmp_lang(a: Option<&str>, b: Option<&str>) -> Ordering {
    // Language tags compare case-insensitively per RFC 5646
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
    }
}

/// Total order over literals under the given comparison flags
///
/// Numeric kinds compare via the promotion lattice when promotion is
/// enabled; otherwise (and for everything else) kind-class rank decides
/// first, then the payload within the class. Used for sorting and by the
/// rowsort map; equality (`equals`) is `compare == Equal`.
pub fn compare(a: &Literal, b: &Literal, config: &CompareConfig) -> Ordering {
    if config.promote_numerics {
        if let Some(ord) = compare_numeric(a, b) {
            return ord;
        }
    }

    let (ra, rb) = (class_rank(a), class_rank(b));
    if ra != rb {
        return ra.cmp(&rb);
    }

    match (a, b) {
        (Literal::Uri(x), Literal::Uri(y)) => x.cmp(y),
        (Literal::BlankNode(x), Literal::BlankNode(y)) => x.cmp(y),
        (
            Literal::String {
                value: xv,
                language: xl,
                datatype: xd,
            },
            Literal::String {
                value: yv,
                language: yl,
                datatype: yd,
            },
        ) => cmp_str(xv, yv, config.case_insensitive)
            .then_with(|| cmp_lang(xl.as_deref(), yl.as_deref()))
            .then_with(|| xd.cmp(yd)),
        (Literal::Boolean(x), Literal::Boolean(y)) => x.cmp(y),
        (Literal::Integer(x), Literal::Integer(y)) => x.cmp(y),
        (
            Literal::IntegerSubtype {
                value: x,
                datatype: xd,
            },
            Literal::IntegerSubtype {
                value: y,
                datatype: yd,
            },
        ) => x.cmp(y).then_with(|| xd.cmp(yd)),
        (Literal::Integer(x), Literal::IntegerSubtype { value: y, .. }) => x.cmp(y),
        (Literal::IntegerSubtype { value: x, .. }, Literal::Integer(y)) => x.cmp(y),
        (Literal::Float(x), Literal::Float(y)) => cmp_f64(f64::from(*x), f64::from(*y)),
        (Literal::Double(x), Literal::Double(y)) => cmp_f64(*x, *y),
        (Literal::Decimal(x), Literal::Decimal(y)) => x.cmp(y),
        (Literal::Date(x), Literal::Date(y)) => x.cmp(y),
        (Literal::DateTime(x), Literal::DateTime(y)) => x.cmp(y),
        (
            Literal::Pattern {
                value: xv,
                flags: xf,
            },
            Literal::Pattern {
                value: yv,
                flags: yf,
            },
        ) => xv.cmp(yv).then_with(|| xf.cmp(yf)),
        (Literal::QName(x), Literal::QName(y)) => x.cmp(y),
        (
            Literal::Udt {
                value: xv,
                datatype: xd,
            },
            Literal::Udt {
                value: yv,
                datatype: yd,
            },
        ) => xd.cmp(yd).then_with(|| xv.cmp(yv)),
        (Literal::Variable(x), Literal::Variable(y)) => x.cmp(y),
        // Remaining case: mixed numeric kinds with promotion disabled -
        // order by lattice position, never equal across kinds
        _ => {
            let ka = a.numeric_kind();
            let kb = b.numeric_kind();
            ka.cmp(&kb)
        }
    }
}

/// Equality under the given comparison flags
pub fn equals(a: &Literal, b: &Literal, config: &CompareConfig) -> bool {
    compare(a, b, config) == Ordering::Equal
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Uri(u) => write!(f, "<{u}>"),
            Literal::BlankNode(b) => write!(f, "_:{b}"),
            Literal::String {
                value,
                language,
                datatype,
            } => {
                write!(f, "\"{value}\"")?;
                if let Some(lang) = language {
                    write!(f, "@{lang}")?;
                }
                if let Some(dt) = datatype {
                    write!(f, "^^<{dt}>")?;
                }
                Ok(())
            }
            Literal::Boolean(b) => write!(f, "{b}"),
            Literal::Integer(v) | Literal::IntegerSubtype { value: v, .. } => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v}"),
            Literal::Double(v) => write!(f, "{v}"),
            Literal::Decimal(d) => write!(f, "{d}"),
            Literal::Date(d) => write!(f, "{d}"),
            Literal::DateTime(d) => write!(f, "{}", d.to_rfc3339()),
            Literal::Variable(id) => write!(f, "?{}", id.0),
            Literal::Pattern { value, flags } => {
                write!(f, "/{value}/{}", flags.as_deref().unwrap_or(""))
            }
            Literal::QName(q) => write!(f, "{q}"),
            Literal::Udt { value, datatype } => write!(f, "\"{value}\"^^<{datatype}>"),
        }
    }
}
