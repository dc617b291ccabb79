//! Sample data inserted at startup when `store.seed_sample_data` is set.

use serde_json::json;

use crate::domain::{
    CategoryRepository, ConversationRepository, MessageType, NewMessage, NewOrder, NewOrderItem,
    NewProduct, NewProductOption, NewUser, OptionType, OrderRepository, OrderStatus,
    ProductRepository, UserRepository,
};
use crate::domain::services::PricingService;
use crate::shared::error::AppError;
use crate::shared::password::hash_password;

use super::MemoryStore;

/// (type, value, modifier in cents). Every product gets the same option grid.
const STANDARD_OPTIONS: [(OptionType, &str, i64); 11] = [
    (OptionType::Size, "2in", 0),
    (OptionType::Size, "3in", 50),
    (OptionType::Size, "4in", 100),
    (OptionType::Material, "vinyl", 0),
    (OptionType::Material, "clear", 0),
    (OptionType::Material, "holographic", 0),
    (OptionType::Material, "glitter", 0),
    (OptionType::Finish, "glossy", 0),
    (OptionType::Finish, "matte", 25),
    (OptionType::Shape, "die-cut", 0),
    (OptionType::Shape, "circle", 0),
];

/// (title, description, price in cents, category slug)
const PRODUCTS: [(&str, &str, i64, &str); 6] = [
    ("Space Cat", "A cat floating among the stars.", 350, "animals"),
    ("Sleepy Fox", "Curled up fox in autumn colors.", 325, "animals"),
    ("Mountain Sunrise", "Layered peaks at first light.", 300, "nature"),
    ("Monstera Leaf", "Bold tropical leaf, die-cut.", 275, "nature"),
    ("Pizza Slice", "Cheesy slice with a smile.", 250, "food"),
    ("Boba Tea", "Brown sugar boba with pearls.", 275, "food"),
];

/// Populate an empty store with an admin, a demo customer, a small catalog
/// and one demo order with its conversation.
///
/// Credentials: `admin` / `admin123` and `demo` / `demo123`.
pub async fn seed_sample_data(store: &MemoryStore) -> Result<(), AppError> {
    let admin = store
        .create(NewUser {
            username: "admin".into(),
            email: "admin@stickershop.local".into(),
            password_hash: hash_password("admin123")?,
            display_name: Some("Shop Admin".into()),
            is_admin: true,
        })
        .await?;

    let customer = store
        .create(NewUser {
            username: "demo".into(),
            email: "demo@stickershop.local".into(),
            password_hash: hash_password("demo123")?,
            display_name: Some("Demo Customer".into()),
            is_admin: false,
        })
        .await?;

    let mut category_ids = Vec::new();
    for (name, slug, description) in [
        ("Animals", "animals", "Critters of every kind"),
        ("Nature", "nature", "Plants, peaks and skies"),
        ("Food", "food", "Snacks you can stick"),
    ] {
        let category = store
            .create_category(name.into(), slug.into(), Some(description.into()))
            .await?;
        category_ids.push((slug, category.id));
    }

    let mut first_product = None;
    for (title, description, price, slug) in PRODUCTS {
        let category_id = category_ids
            .iter()
            .find(|(s, _)| *s == slug)
            .map(|(_, id)| *id);

        let product = store
            .create_product(NewProduct {
                title: title.into(),
                description: description.into(),
                image_url: format!("/images/{}.png", title.to_lowercase().replace(' ', "-")),
                price,
                category_id,
                external_id: None,
            })
            .await?;

        for (option_type, value, price_modifier) in STANDARD_OPTIONS {
            store
                .create_option(NewProductOption {
                    product_id: product.id,
                    option_type,
                    value: value.into(),
                    price_modifier,
                    in_stock: true,
                })
                .await?;
        }

        if first_product.is_none() {
            first_product = Some(product);
        }
    }

    let Some(product) = first_product else {
        return Ok(());
    };

    let selection = json!({"size": "3in", "material": "holographic"});
    let options = store.options_for(product.id).await?;
    let quote = PricingService::quote_selection(product.price, &options, &selection, 50)
        .map_err(|e| AppError::Internal(format!("Seed pricing failed: {}", e)))?;

    let (order, _) = store
        .create_order(
            NewOrder {
                user_id: customer.id,
                status: OrderStatus::Processing,
                total: quote.total,
                shipping_address: "123 Sticker Lane, Portland, OR 97201".into(),
                payment_intent_id: None,
            },
            vec![NewOrderItem {
                product_id: product.id,
                quantity: quote.quantity,
                price: quote.unit_price,
                options: selection,
                custom_design_url: None,
            }],
        )
        .await?;

    let conversation = store
        .create_conversation(customer.id, Some(order.id), false)
        .await?;
    for (sender, content) in [
        (customer.id, "Hi! Can the holographic ones have a white border?"),
        (admin.id, "Absolutely, we'll add a 1/8in border before printing."),
    ] {
        store
            .append_message(NewMessage {
                conversation_id: conversation.id,
                user_id: sender,
                message_type: MessageType::Text,
                content: content.into(),
                image_url: None,
            })
            .await?;
    }

    tracing::info!(
        users = 2,
        products = PRODUCTS.len(),
        order_id = order.id,
        "Seeded sample data"
    );

    Ok(())
}
