use serde::Serializer;

/// Serializes a float rounded to 2 decimal places.
///
/// Used for presentation only, the value in memory keeps full precision. Ties
/// round to even, like the vendor app.
pub fn serialize_rounded_2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64((value * 100.0).round_ties_even() / 100.0)
}
