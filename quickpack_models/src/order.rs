use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    submission::{text, Submission},
    validation::{check_required_fields, is_valid_email},
};

/// A validated submission of the order form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSubmission {
    pub product_details: ProductDetails,
    /// Total quantity of the order.
    pub quantity: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Single,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductDetails {
    Single(ProductDetail),
    Custom(Vec<ProductDetail>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDetail {
    pub size: Option<String>,
    pub product_type: Option<String>,
    pub dimensions: Option<String>,
    pub quantity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    #[error("All required fields must be filled")]
    MissingFields(Vec<String>),
    #[error("Invalid product details format")]
    InvalidFormat(#[from] InvalidFormat),
    #[error("Product details are required")]
    ProductDetailsRequired,
    #[error("Custom orders require an array of product details")]
    CustomOrderRequiresItems,
    #[error("Product size is required for single item orders")]
    ProductSizeRequired,
    #[error("Invalid email format")]
    InvalidEmail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Invalid productDetails format")]
pub struct InvalidFormat;

impl OrderSubmission {
    pub const REQUIRED_FIELDS: &'static [&'static str] = &[
        "name",
        "email",
        "phone",
        "address",
        "city",
        "province",
        "postalCode",
    ];

    pub fn order_type(&self) -> OrderType {
        self.product_details.order_type()
    }
}

impl OrderType {
    /// Anything but `"custom"` is treated as a single item order.
    pub fn from_submission(data: &Submission) -> Self {
        match data.text("orderType").as_deref() {
            Some("custom") => Self::Custom,
            _ => Self::Single,
        }
    }
}

impl ProductDetails {
    pub fn order_type(&self) -> OrderType {
        match self {
            Self::Single(_) => OrderType::Single,
            Self::Custom(_) => OrderType::Custom,
        }
    }

    /// Resolve the structured product details according to the order type.
    pub fn resolve(order_type: OrderType, value: &Value) -> Result<Self, OrderValidationError> {
        match order_type {
            OrderType::Custom => match value {
                Value::Array(items) if !items.is_empty() => Ok(Self::Custom(
                    items.iter().map(ProductDetail::from_value).collect(),
                )),
                _ => Err(OrderValidationError::CustomOrderRequiresItems),
            },
            OrderType::Single => match value {
                Value::Object(_) => {
                    let detail = ProductDetail::from_value(value);
                    if detail.size.is_none() {
                        return Err(OrderValidationError::ProductSizeRequired);
                    }
                    Ok(Self::Single(detail))
                }
                _ => Err(OrderValidationError::ProductSizeRequired),
            },
        }
    }
}

impl ProductDetail {
    /// Extract the known fields of a product object. Values that are not
    /// objects yield a detail with every field unset.
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).and_then(text);
        Self {
            size: field("size"),
            product_type: field("type"),
            dimensions: field("dimensions"),
            quantity: field("quantity"),
        }
    }

    pub fn type_label(&self) -> &'static str {
        match self.product_type.as_deref() {
            Some("pizza-box") => "Pizza Box",
            _ => "Paper Cup",
        }
    }
}

/// Decode product details that may have been sent as a JSON encoded string
/// (e.g. in a query parameter).
///
/// If decoding fails, a single item is reconstructed from the `productSize`,
/// `productType` and `dimensions` fields of the submission.
pub fn parse_product_details(
    value: Option<&Value>,
    fallback: &Submission,
) -> Result<Option<Value>, InvalidFormat> {
    let Some(value) = value else {
        return Ok(None);
    };

    let Value::String(encoded) = value else {
        return Ok(Some(value.clone()));
    };

    if let Ok(decoded) = serde_json::from_str(encoded) {
        return Ok(Some(decoded));
    }

    let size = fallback.text("productSize").ok_or(InvalidFormat)?;
    Ok(Some(json!({
        "size": size,
        "type": fallback.text("productType").unwrap_or_else(|| "pizza-box".into()),
        "dimensions": fallback.text("dimensions"),
    })))
}

impl TryFrom<&Submission> for OrderSubmission {
    type Error = OrderValidationError;

    fn try_from(data: &Submission) -> Result<Self, Self::Error> {
        let required = check_required_fields(data, Self::REQUIRED_FIELDS);
        if !required.ok {
            return Err(OrderValidationError::MissingFields(required.missing));
        }

        let product_details = parse_product_details(data.get("productDetails"), data)?
            .filter(|value| !value.is_null())
            .ok_or(OrderValidationError::ProductDetailsRequired)?;
        let product_details =
            ProductDetails::resolve(OrderType::from_submission(data), &product_details)?;

        let field = |name: &str| data.text(name).unwrap_or_default();
        let email = field("email");
        if !is_valid_email(&email) {
            return Err(OrderValidationError::InvalidEmail);
        }

        Ok(Self {
            product_details,
            quantity: data.text("quantity"),
            name: field("name"),
            email,
            phone: field("phone"),
            address: field("address"),
            city: field("city"),
            province: field("province"),
            postal_code: field("postalCode"),
            additional_notes: data.text("additionalNotes"),
        })
    }
}
