use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

fn gcd(a: i64, b: i64) -> u64 {
	let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
	while b != 0 {
		let t = b;
		b = a % b;
		a = t;
	}
	a
}

/// Scalar literal. Exact while the arithmetic stays rational and fits into `i64`, otherwise falls back to `f64`.
///
/// Invariant for `Rational(num, den)`: `den > 0` and `gcd(num, den) == 1`.
#[derive(Clone, Copy, Debug)]
pub enum Number {
	Rational(i64, i64),
	Float(f64),
}

impl Number {
	pub const ZERO: Number = Number::Rational(0, 1);
	pub const ONE: Number = Number::Rational(1, 1);
	pub const MINUS_ONE: Number = Number::Rational(-1, 1);

	pub fn int(n: i64) -> Self {
		Number::Rational(n, 1)
	}

	pub fn rational(num: i64, den: i64) -> Self {
		if den == 0 {
			return Number::Float(match num {
				0 => f64::NAN,
				n if n > 0 => f64::INFINITY,
				_ => f64::NEG_INFINITY,
			});
		}
		let (num, den) = if den < 0 {
			match (num.checked_neg(), den.checked_neg()) {
				(Some(num), Some(den)) => (num, den),
				_ => return Number::Float(num as f64 / den as f64),
			}
		} else {
			(num, den)
		};
		// `den > 0` keeps the gcd within `i64`
		match i64::try_from(gcd(num, den).max(1)) {
			Ok(g) => Number::Rational(num / g, den / g),
			Err(_) => Number::Float(num as f64 / den as f64),
		}
	}

	/// Exact when `f` is integral, float otherwise.
	pub fn from_f64(f: f64) -> Self {
		if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
			Number::int(f as i64)
		} else {
			Number::Float(f)
		}
	}

	/// Parses a decimal literal such as `12` or `0.25` exactly.
	pub fn parse_decimal(text: &str) -> Option<Self> {
		match text.split_once('.') {
			None => text.parse().ok().map(Number::int).or_else(|| text.parse().ok().map(Number::Float)),
			Some((int, frac)) => {
				let digits = format!("{}{}", int, frac);
				let exact = u32::try_from(frac.len()).ok()
					.and_then(|len| 10i64.checked_pow(len))
					.and_then(|den| digits.parse::<i64>().ok().map(|num| Number::rational(num, den)));
				exact.or_else(|| text.parse().ok().map(Number::Float))
			},
		}
	}

	pub fn to_f64(self) -> f64 {
		match self {
			Number::Rational(n, d) => n as f64 / d as f64,
			Number::Float(f) => f,
		}
	}

	pub fn is_zero(self) -> bool {
		match self {
			Number::Rational(n, _) => n == 0,
			Number::Float(f) => f == 0.0,
		}
	}

	pub fn is_one(self) -> bool {
		matches!(self, Number::Rational(1, 1))
	}

	pub fn is_negative(self) -> bool {
		self.to_f64() < 0.0
	}

	pub fn as_integer(self) -> Option<i64> {
		match self {
			Number::Rational(n, 1) => Some(n),
			_ => None,
		}
	}

	pub fn is_exact(self) -> bool {
		matches!(self, Number::Rational(..))
	}

	pub fn abs(self) -> Self {
		if self.is_negative() { -self } else { self }
	}

	pub fn recip(self) -> Self {
		Number::ONE / self
	}

	/// `self^exponent`, exact for integer exponents and for rational roots of perfect powers.
	pub fn pow(self, exponent: Number) -> Self {
		if let Some(e) = exponent.as_integer() {
			return self.pow_int(e);
		}
		if let (Number::Rational(n, d), Number::Rational(p, q)) = (self, exponent) {
			if n >= 0 {
				if let (Some(rn), Some(rd)) = (exact_root(n, q), exact_root(d, q)) {
					return Number::rational(rn, rd).pow_int(p);
				}
			}
		}
		Number::from_f64(self.to_f64().powf(exponent.to_f64()))
	}

	fn pow_int(self, e: i64) -> Self {
		if e < 0 {
			return match e.checked_neg() {
				Some(e) => self.pow_int(e).recip(),
				None => Number::Float(self.to_f64().powf(e as f64)),
			};
		}
		match (self, u32::try_from(e)) {
			(Number::Rational(n, d), Ok(e)) => match (n.checked_pow(e), d.checked_pow(e)) {
				(Some(n), Some(d)) => Number::rational(n, d),
				_ => Number::Float((n as f64 / d as f64).powf(e as f64)),
			},
			_ => Number::from_f64(self.to_f64().powf(e as f64)),
		}
	}

	fn total_key(&self) -> f64 {
		self.to_f64()
	}
}

fn exact_root(value: i64, degree: i64) -> Option<i64> {
	let degree = u32::try_from(degree).ok()?;
	let guess = (value as f64).powf(1.0 / degree as f64).round() as i64;
	(guess.checked_pow(degree)? == value).then(|| guess)
}

fn exact_or_float(
	a: Number,
	b: Number,
	exact: impl FnOnce(i64, i64, i64, i64) -> Option<(i64, i64)>,
	float: impl FnOnce(f64, f64) -> f64,
) -> Number {
	match (a, b) {
		(Number::Rational(an, ad), Number::Rational(bn, bd)) => match exact(an, ad, bn, bd) {
			Some((n, d)) => Number::rational(n, d),
			None => Number::from_f64(float(a.to_f64(), b.to_f64())),
		},
		_ => Number::Float(float(a.to_f64(), b.to_f64())),
	}
}

impl std::ops::Add for Number {
	type Output = Number;

	fn add(self, other: Number) -> Number {
		exact_or_float(self, other, |an, ad, bn, bd| {
			Some((an.checked_mul(bd)?.checked_add(bn.checked_mul(ad)?)?, ad.checked_mul(bd)?))
		}, |a, b| a + b)
	}
}

impl std::ops::Sub for Number {
	type Output = Number;

	fn sub(self, other: Number) -> Number {
		self + -other
	}
}

impl std::ops::Mul for Number {
	type Output = Number;

	fn mul(self, other: Number) -> Number {
		exact_or_float(self, other, |an, ad, bn, bd| {
			Some((an.checked_mul(bn)?, ad.checked_mul(bd)?))
		}, |a, b| a * b)
	}
}

impl std::ops::Div for Number {
	type Output = Number;

	fn div(self, other: Number) -> Number {
		exact_or_float(self, other, |an, ad, bn, bd| {
			Some((an.checked_mul(bd)?, ad.checked_mul(bn)?))
		}, |a, b| a / b)
	}
}

impl std::ops::Neg for Number {
	type Output = Number;

	fn neg(self) -> Number {
		match self {
			Number::Rational(n, d) => match n.checked_neg() {
				Some(n) => Number::Rational(n, d),
				None => Number::Float(-(n as f64) / d as f64),
			},
			Number::Float(f) => Number::Float(-f),
		}
	}
}

impl PartialEq for Number {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Number::Rational(a, b), Number::Rational(c, d)) => a == c && b == d,
			(Number::Float(a), Number::Float(b)) => a.to_bits() == b.to_bits(),
			_ => false,
		}
	}
}

impl Eq for Number {}

impl Hash for Number {
	fn hash<H: Hasher>(&self, state: &mut H) {
		match self {
			Number::Rational(n, d) => { 0u8.hash(state); n.hash(state); d.hash(state); },
			Number::Float(f) => { 1u8.hash(state); f.to_bits().hash(state); },
		}
	}
}

impl Ord for Number {
	fn cmp(&self, other: &Self) -> Ordering {
		self.total_key().total_cmp(&other.total_key())
			.then_with(|| match (self, other) {
				(Number::Rational(a, b), Number::Rational(c, d)) => (a, b).cmp(&(c, d)),
				(Number::Float(a), Number::Float(b)) => a.to_bits().cmp(&b.to_bits()),
				(Number::Rational(..), Number::Float(_)) => Ordering::Less,
				(Number::Float(_), Number::Rational(..)) => Ordering::Greater,
			})
	}
}

impl PartialOrd for Number {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl fmt::Display for Number {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Number::Rational(n, 1) => write!(f, "{}", n),
			Number::Rational(n, d) => write!(f, "{}/{}", n, d),
			Number::Float(x) if x.is_nan() => write!(f, "nan"),
			Number::Float(x) if x.is_infinite() => write!(f, "{}", if *x > 0.0 { "oo" } else { "-oo" }),
			Number::Float(x) => write!(f, "{}", x),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rationals_are_reduced() {
		assert_eq!(Number::rational(2, -4), Number::Rational(-1, 2));
		assert_eq!(Number::int(1) / Number::int(3) * Number::int(3), Number::ONE);
	}

	#[test]
	fn extreme_integers_do_not_overflow() {
		assert_eq!(Number::rational(i64::MIN, 1), Number::Rational(i64::MIN, 1));
		assert_eq!(Number::rational(i64::MIN, 2), Number::Rational(i64::MIN / 2, 1));
		assert_eq!(Number::int(-4611686018427387904) * Number::int(2), Number::Rational(i64::MIN, 1));
		assert_eq!(-Number::int(i64::MIN), Number::Float(9223372036854775808.0));
	}

	#[test]
	fn decimals_parse_exactly() {
		assert_eq!(Number::parse_decimal("0.25"), Some(Number::Rational(1, 4)));
		assert_eq!(Number::parse_decimal("12"), Some(Number::int(12)));
	}

	#[test]
	fn perfect_roots_stay_exact() {
		assert_eq!(Number::int(4).pow(Number::rational(1, 2)), Number::int(2));
		assert_eq!(Number::rational(8, 27).pow(Number::rational(2, 3)), Number::rational(4, 9));
		assert!(!Number::int(2).pow(Number::rational(1, 2)).is_exact());
	}

	#[test]
	fn division_by_zero_is_infinite() {
		assert_eq!(Number::ONE / Number::ZERO, Number::Float(f64::INFINITY));
		assert_eq!(format!("{}", Number::ONE / Number::ZERO), "oo");
	}
}
