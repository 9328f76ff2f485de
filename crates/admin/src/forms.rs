//! Catalog forms: raw submitted values, validation and field errors.
//!
//! Forms keep what the browser sent so a failed submission re-renders with
//! the admin's input intact. Name uniqueness needs the database and is checked
//! by the handlers after [`ProductForm::validate`] / [`ChoiceForm::validate`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use marketstall_core::{CategoryId, Money, ProductTypeId};

use crate::models::{AdminProduct, Choice, ChoiceInput, ProductInput};

pub const MAX_NAME_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;
/// `NUMERIC(20, 2)`
pub const PRICE_MAX_DIGITS: u32 = 20;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

const REQUIRED: &str = "This field is required.";
const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

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

/// Message for a name already used by another row.
#[must_use]
pub fn duplicate_name_message(label: &str) -> String {
    format!("{label} with this Name already exists.")
}

fn trimmed(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn validate_name(errors: &mut FieldErrors, raw: &str) -> String {
    let Some(name) = trimmed(raw) else {
        errors.add("name", REQUIRED);
        return String::new();
    };
    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        errors.add(
            "name",
            format!("Ensure this value has at most {MAX_NAME_LENGTH} characters (it has {length})."),
        );
    }
    name.to_string()
}

fn validate_image_url(errors: &mut FieldErrors, raw: &str) -> String {
    let Some(value) = trimmed(raw) else {
        return String::new();
    };
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => value.to_string(),
        _ => {
            errors.add("image_url", "Enter a valid URL.");
            String::new()
        }
    }
}

/// Total digits and decimal places of an amount, ignoring trailing zeros.
fn digit_counts(amount: Decimal) -> (u32, u32) {
    let normalized = amount.normalize();
    let decimals = normalized.scale();
    let mantissa = normalized.mantissa().unsigned_abs();
    let mantissa_digits = if mantissa == 0 { 1 } else { mantissa.ilog10() + 1 };
    (mantissa_digits.max(decimals), decimals)
}

/// Parse a price field. `default` applies when the field is empty; without
/// one the field is required.
fn validate_price(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
    default: Option<Money>,
) -> Money {
    let Some(value) = trimmed(raw) else {
        if default.is_none() {
            errors.add(field, REQUIRED);
        }
        return default.unwrap_or(Money::ZERO);
    };

    let Ok(amount) = Money::parse(value) else {
        errors.add(field, "Enter a number.");
        return Money::ZERO;
    };

    if amount.is_negative() {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
    }

    let (digits, decimals) = digit_counts(amount.amount());
    let whole_digits = digits - decimals;
    let max_whole = PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES;
    if digits > PRICE_MAX_DIGITS {
        errors.add(
            field,
            format!("Ensure that there are no more than {PRICE_MAX_DIGITS} digits in total."),
        );
    } else if decimals > PRICE_DECIMAL_PLACES {
        errors.add(
            field,
            format!("Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."),
        );
    } else if whole_digits > max_whole {
        errors.add(
            field,
            format!("Ensure that there are no more than {max_whole} digits before the decimal point."),
        );
    }

    amount
}

/// Parse an optional foreign key that must be one of `known`.
fn validate_choice<T>(
    errors: &mut FieldErrors,
    field: &'static str,
    raw: &str,
    known: &[i32],
) -> Option<T>
where
    T: From<i32>,
{
    let value = trimmed(raw)?;
    match value.parse::<i32>() {
        Ok(id) if known.contains(&id) => Some(T::from(id)),
        _ => {
            errors.add(field, INVALID_CHOICE);
            None
        }
    }
}

/// Submitted product form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub product_type: String,
    pub category: String,
    pub description: String,
    pub original_price: String,
    pub price: String,
    pub shipping: String,
    /// Checkbox: present when ticked.
    pub digital: Option<String>,
    pub image_url: String,
}

impl ProductForm {
    /// Whether the digital checkbox is ticked.
    #[must_use]
    pub const fn is_digital(&self) -> bool {
        self.digital.is_some()
    }

    /// Validate into a [`ProductInput`].
    ///
    /// `product_types` and `categories` are the IDs the selects may hold.
    ///
    /// # Errors
    ///
    /// Returns the field errors when any value is missing or malformed.
    pub fn validate(
        &self,
        product_types: &[i32],
        categories: &[i32],
    ) -> Result<ProductInput, FieldErrors> {
        let mut errors = FieldErrors::default();

        let name = validate_name(&mut errors, &self.name);
        let product_type_id =
            validate_choice::<ProductTypeId>(&mut errors, "product_type", &self.product_type, product_types);
        let category_id =
            validate_choice::<CategoryId>(&mut errors, "category", &self.category, categories);

        let description = self.description.trim().to_string();
        let description_length = description.chars().count();
        if description_length > MAX_DESCRIPTION_LENGTH {
            errors.add(
                "description",
                format!(
                    "Ensure this value has at most {MAX_DESCRIPTION_LENGTH} characters (it has {description_length})."
                ),
            );
        }

        let original_price = validate_price(&mut errors, "original_price", &self.original_price, None);
        let price = validate_price(&mut errors, "price", &self.price, None);
        let shipping = validate_price(&mut errors, "shipping", &self.shipping, Some(Money::ZERO));
        let image_url = validate_image_url(&mut errors, &self.image_url);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ProductInput {
            name,
            product_type_id,
            category_id,
            description,
            original_price,
            price,
            shipping,
            digital: self.is_digital(),
            image_url,
        })
    }
}

impl From<&AdminProduct> for ProductForm {
    fn from(product: &AdminProduct) -> Self {
        Self {
            name: product.name.clone().unwrap_or_default(),
            product_type: product
                .product_type_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            category: product
                .category_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            description: product.description.clone().unwrap_or_default(),
            original_price: product.original_price.to_string(),
            price: product.price.to_string(),
            shipping: product.shipping.to_string(),
            digital: product.digital.unwrap_or(false).then(|| "on".to_string()),
            image_url: product.image_url.clone().unwrap_or_default(),
        }
    }
}

/// Submitted category or product type form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChoiceForm {
    pub name: String,
    pub image_url: String,
}

impl ChoiceForm {
    /// Validate into a [`ChoiceInput`].
    ///
    /// # Errors
    ///
    /// Returns the field errors when the name is missing or too long, or the
    /// image URL is malformed.
    pub fn validate(&self) -> Result<ChoiceInput, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = validate_name(&mut errors, &self.name);
        let image_url = validate_image_url(&mut errors, &self.image_url);

        if errors.is_empty() {
            Ok(ChoiceInput { name, image_url })
        } else {
            Err(errors)
        }
    }
}

impl From<&Choice> for ChoiceForm {
    fn from(choice: &Choice) -> Self {
        Self {
            name: choice.name.clone().unwrap_or_default(),
            image_url: choice.image_url.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_form() -> ProductForm {
        ProductForm {
            name: "  Ankara tote bag ".to_string(),
            product_type: "1".to_string(),
            category: String::new(),
            description: "Hand-sewn".to_string(),
            original_price: "15000".to_string(),
            price: "12500.50".to_string(),
            shipping: String::new(),
            digital: None,
            image_url: "https://cdn.shop.test/tote.jpg".to_string(),
        }
    }

    #[test]
    fn valid_product_is_trimmed_and_defaults_shipping() {
        let input = product_form().validate(&[1, 2], &[]).unwrap();
        assert_eq!(input.name, "Ankara tote bag");
        assert_eq!(input.product_type_id, Some(ProductTypeId::new(1)));
        assert_eq!(input.category_id, None);
        assert_eq!(input.price, Money::parse("12500.50").unwrap());
        assert_eq!(input.shipping, Money::ZERO);
        assert!(!input.digital);
    }

    #[test]
    fn missing_name_and_price_are_required() {
        let form = ProductForm {
            name: "   ".to_string(),
            price: String::new(),
            ..product_form()
        };
        let errors = form.validate(&[1], &[]).unwrap_err();
        assert_eq!(errors.get("name"), Some(REQUIRED));
        assert_eq!(errors.get("price"), Some(REQUIRED));
        assert_eq!(errors.get("shipping"), None);
    }

    #[test]
    fn long_name_reports_length() {
        let form = ProductForm {
            name: "x".repeat(201),
            ..product_form()
        };
        let errors = form.validate(&[1], &[]).unwrap_err();
        assert_eq!(
            errors.get("name"),
            Some("Ensure this value has at most 200 characters (it has 201).")
        );
    }

    #[test]
    fn prices_must_be_non_negative_with_two_places() {
        let form = ProductForm {
            original_price: "-1".to_string(),
            price: "10.005".to_string(),
            shipping: "abc".to_string(),
            ..product_form()
        };
        let errors = form.validate(&[1], &[]).unwrap_err();
        assert_eq!(
            errors.get("original_price"),
            Some("Ensure this value is greater than or equal to 0.")
        );
        assert_eq!(
            errors.get("price"),
            Some("Ensure that there are no more than 2 decimal places.")
        );
        assert_eq!(errors.get("shipping"), Some("Enter a number."));
    }

    #[test]
    fn trailing_zeros_do_not_count_as_places() {
        let form = ProductForm {
            price: "99.5000".to_string(),
            ..product_form()
        };
        assert!(form.validate(&[1], &[]).is_ok());
    }

    #[test]
    fn too_many_whole_digits_are_rejected() {
        let form = ProductForm {
            price: "1".repeat(19),
            ..product_form()
        };
        let errors = form.validate(&[1], &[]).unwrap_err();
        assert_eq!(
            errors.get("price"),
            Some("Ensure that there are no more than 18 digits before the decimal point.")
        );
    }

    #[test]
    fn unknown_choice_is_rejected() {
        let form = ProductForm {
            product_type: "7".to_string(),
            category: "nope".to_string(),
            ..product_form()
        };
        let errors = form.validate(&[1], &[3]).unwrap_err();
        assert_eq!(errors.get("product_type"), Some(INVALID_CHOICE));
        assert_eq!(errors.get("category"), Some(INVALID_CHOICE));
    }

    #[test]
    fn image_url_must_be_http() {
        let form = ProductForm {
            image_url: "javascript:alert(1)".to_string(),
            ..product_form()
        };
        let errors = form.validate(&[1], &[]).unwrap_err();
        assert_eq!(errors.get("image_url"), Some("Enter a valid URL."));
    }

    #[test]
    fn checkbox_sets_digital() {
        let form = ProductForm {
            digital: Some("on".to_string()),
            ..product_form()
        };
        assert!(form.validate(&[1], &[]).unwrap().digital);
    }

    #[test]
    fn choice_requires_name() {
        let errors = ChoiceForm::default().validate().unwrap_err();
        assert_eq!(errors.get("name"), Some(REQUIRED));

        let input = ChoiceForm {
            name: " Fabrics ".to_string(),
            image_url: String::new(),
        }
        .validate()
        .unwrap();
        assert_eq!(input.name, "Fabrics");
    }

    #[test]
    fn duplicate_message_names_the_kind() {
        assert_eq!(
            duplicate_name_message("Category"),
            "Category with this Name already exists."
        );
    }

    #[test]
    fn digit_counts_cover_fractions() {
        assert_eq!(digit_counts(Decimal::new(5, 2)), (2, 2));
        assert_eq!(digit_counts(Decimal::new(125_050, 2)), (5, 1));
        assert_eq!(digit_counts(Decimal::ZERO), (1, 0));
    }
}
