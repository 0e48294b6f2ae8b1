//! Projection compiler: field lists to projection expressions.

use super::namer::ExpressionAttributes;

/// Compile a space- or comma-separated field list into a projection
/// expression, registering one name token per path segment.
///
/// `"name, address.city"` becomes `#k_name, #k_address.#k_city`.
#[must_use]
pub fn compile_projection(fields: &str, attributes: &mut ExpressionAttributes) -> String {
    fields
        .split([' ', ','])
        .filter(|field| !field.is_empty())
        .map(|field| attributes.key_name(field))
        .collect::<Vec<_>>()
        .join(", ")
}
