//! Query-string forms for the filtered catalog and product search.
//!
//! Browsers submit every input, so empty strings mean "not set". Values that
//! are present but malformed produce field errors instead of a filter.

use std::collections::BTreeMap;

use serde::Deserialize;

use marketstall_core::{CategoryId, Money, ProductTypeId};

use crate::db::ProductFilter;

/// Longest accepted search query.
pub const MAX_QUERY_LENGTH: usize = 100;

/// Field-level validation messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    /// Record an error for a field (the first error wins).
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Message for a field, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether no field has an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Raw `GET /categories/` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductFilterForm {
    pub product_type: String,
    pub category: String,
    pub price_min: String,
    pub price_max: String,
    pub description: String,
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn parse_price(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
) -> Option<Money> {
    let value = non_empty(raw)?;
    match Money::parse(value) {
        Ok(amount) => Some(amount),
        Err(_) => {
            errors.add(field, "Enter a number.");
            None
        }
    }
}

impl ProductFilterForm {
    /// Validate into a [`ProductFilter`].
    ///
    /// # Errors
    ///
    /// Returns the field errors when any present value does not parse.
    pub fn validate(&self) -> Result<ProductFilter, FieldErrors> {
        let mut errors = FieldErrors::default();

        let product_type = non_empty(&self.product_type).and_then(|v| {
            v.parse::<ProductTypeId>()
                .map_err(|_| errors.add("product_type", "Select a valid choice."))
                .ok()
        });
        let category = non_empty(&self.category).and_then(|v| {
            v.parse::<CategoryId>()
                .map_err(|_| errors.add("category", "Select a valid choice."))
                .ok()
        });
        let price_min = parse_price(&mut errors, "price_min", &self.price_min);
        let price_max = parse_price(&mut errors, "price_max", &self.price_max);
        let description = non_empty(&self.description).map(str::to_string);

        if errors.is_empty() {
            Ok(ProductFilter {
                product_type,
                category,
                price_min,
                price_max,
                description,
            })
        } else {
            Err(errors)
        }
    }
}

/// Raw `GET /shop/` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub query: String,
}

impl SearchForm {
    /// The trimmed query, `None` when empty.
    ///
    /// # Errors
    ///
    /// Returns a field error when the query is longer than
    /// [`MAX_QUERY_LENGTH`] characters.
    pub fn validate(&self) -> Result<Option<&str>, FieldErrors> {
        let Some(query) = non_empty(&self.query) else {
            return Ok(None);
        };
        if query.chars().count() > MAX_QUERY_LENGTH {
            let mut errors = FieldErrors::default();
            errors.add(
                "query",
                format!("Ensure this value has at most {MAX_QUERY_LENGTH} characters."),
            );
            return Err(errors);
        }
        Ok(Some(query))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> ProductFilterForm {
        let mut form = ProductFilterForm::default();
        for &(key, value) in pairs {
            let slot = match key {
                "product_type" => &mut form.product_type,
                "category" => &mut form.category,
                "price_min" => &mut form.price_min,
                "price_max" => &mut form.price_max,
                _ => &mut form.description,
            };
            *slot = value.to_string();
        }
        form
    }

    #[test]
    fn empty_parameters_are_ignored() {
        let f = form(&[("product_type", ""), ("category", " "), ("price_min", "")]);
        assert_eq!(f.validate().unwrap(), ProductFilter::default());
    }

    #[test]
    fn parses_every_field() {
        let filter = form(&[
            ("product_type", "2"),
            ("category", "5"),
            ("price_min", "100"),
            ("price_max", "2500.50"),
            ("description", " cotton "),
        ])
        .validate()
        .unwrap();
        assert_eq!(filter.product_type, Some(ProductTypeId::new(2)));
        assert_eq!(filter.category, Some(CategoryId::new(5)));
        assert_eq!(filter.price_min, Some(Money::parse("100").unwrap()));
        assert_eq!(filter.price_max, Some(Money::parse("2500.5").unwrap()));
        assert_eq!(filter.description.as_deref(), Some("cotton"));
    }

    #[test]
    fn bad_numbers_become_field_errors() {
        let errors = form(&[("price_min", "cheap"), ("category", "shoes")])
            .validate()
            .unwrap_err();
        assert_eq!(errors.get("price_min"), Some("Enter a number."));
        assert_eq!(errors.get("category"), Some("Select a valid choice."));
        assert_eq!(errors.get("price_max"), None);
    }

    #[test]
    fn search_query_length_limit() {
        let ok = SearchForm {
            query: "a".repeat(100),
        };
        assert!(ok.validate().unwrap().is_some());

        let long = SearchForm {
            query: "a".repeat(101),
        };
        assert!(long.validate().unwrap_err().get("query").is_some());

        let blank = SearchForm {
            query: "   ".to_string(),
        };
        assert_eq!(blank.validate().unwrap(), None);
    }
}
