use std::{fmt, ops};

/// This represents a runtime value and its data.
///
/// # Notes
///
/// Numbers are the only values the language has so far. The enum leaves room for
/// booleans, `nil` and heap objects, but none of the code here assumes they exist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// A double-precision floating point number
    Number(f64),
}

impl Value {
    /// Cast the value as a number
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => {
                if n.trunc().eq(n) {
                    write!(f, "{n:.0?}")
                } else {
                    write!(f, "{n:?}")
                }
            }
        }
    }
}

impl ops::Add for &Value {
    type Output = Value;

    fn add(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Value::Number(n1), Value::Number(n2)) => Value::Number(n1 + n2),
        }
    }
}

impl ops::Sub for &Value {
    type Output = Value;

    fn sub(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Value::Number(n1), Value::Number(n2)) => Value::Number(n1 - n2),
        }
    }
}

impl ops::Mul for &Value {
    type Output = Value;

    fn mul(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Value::Number(n1), Value::Number(n2)) => Value::Number(n1 * n2),
        }
    }
}

/// Division follows IEEE 754, dividing by zero gives an infinity or `NaN`.
impl ops::Div for &Value {
    type Output = Value;

    fn div(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Value::Number(n1), Value::Number(n2)) => Value::Number(n1 / n2),
        }
    }
}

impl ops::Neg for &Value {
    type Output = Value;

    fn neg(self) -> Self::Output {
        match self {
            Value::Number(n) => Value::Number(-n),
        }
    }
}
