use serde::Serialize;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait TemplateService: Send + Sync + 'static {
    /// Render the given template.
    ///
    /// Values are inserted verbatim, so all user input must be escaped before
    /// it is put into a template.
    fn render<T: Template + 'static>(&self, template: &T) -> anyhow::Result<String>;
}

#[cfg(feature = "mock")]
impl MockTemplateService {
    pub fn with_render<T: Template + Send + PartialEq + std::fmt::Debug + 'static>(
        mut self,
        template: T,
        result: String,
    ) -> Self {
        self.expect_render::<T>()
            .once()
            .with(mockall::predicate::eq(template))
            .return_once(|_| Ok(result));
        self
    }
}

pub trait Template: Serialize {
    const NAME: &'static str;
    const TEMPLATE: &'static str;
}

pub const BASE_TEMPLATE: &str = include_str!("../templates/base.html");

macro_rules! templates {
    ($( $ident:ident ( $path:literal ), )* ) => {
        $(
            impl Template for $ident {
                const NAME: &'static str = stringify!($ident);
                const TEMPLATE: &'static str = include_str!(concat!("../templates/", $path));
            }
        )*

        pub const TEMPLATES: &[(&str, &str)] = &[
            $( ($ident::NAME, $ident::TEMPLATE) ),*
        ];
    };
}

templates! {
    ContactTemplate("contact.html"),
    OrderTemplate("order.html"),
}

/// Body of a contact form email. All fields are HTML escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactTemplate {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

/// Body of an order email. All fields are HTML escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderTemplate {
    pub details: OrderDetailsTemplate,
    pub quantity: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub province: String,
    pub postal_code: String,
    pub additional_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OrderDetailsTemplate {
    Single {
        size: String,
        type_label: String,
        dimensions: Option<String>,
    },
    Custom {
        items: Vec<OrderItemTemplate>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItemTemplate {
    pub quantity: String,
    pub size: String,
    pub dimensions: Option<String>,
}
