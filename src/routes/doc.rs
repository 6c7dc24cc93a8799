use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::{Cart, CartItem},
    dto::{
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        orders::{GatewayPayment, OrderList, PlaceOrderRequest, PlaceOrderResponse},
        payment::{CreatePaymentOrderRequest, PaymentOrderResponse},
        products::ProductList,
        user::{AccountState, ProfileResponse, SyncAccountRequest, UpdateProfileRequest},
    },
    models::{Address, Order, PaymentMode, Product, ProductSnapshot},
    response::{ApiResponse, Meta},
    routes::{auth, health, orders, params, payment, products, user},
    wishlist::Wishlist,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::google,
        auth::google_callback,
        user::account,
        user::sync_account,
        user::profile,
        user::update_profile,
        orders::place_order,
        orders::order_history,
        orders::get_order,
        payment::create_payment_order,
        products::list_products,
        products::get_product,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            AccountState,
            SyncAccountRequest,
            ProfileResponse,
            UpdateProfileRequest,
            Cart,
            CartItem,
            Wishlist,
            ProductSnapshot,
            Address,
            PaymentMode,
            PlaceOrderRequest,
            GatewayPayment,
            PlaceOrderResponse,
            OrderList,
            Order,
            CreatePaymentOrderRequest,
            PaymentOrderResponse,
            Product,
            ProductList,
            params::Pagination,
            params::ProductFilter,
            params::ProductSortBy,
            params::SortOrder,
            Meta,
            ApiResponse<AuthResponse>,
            ApiResponse<AccountState>,
            ApiResponse<ProfileResponse>,
            ApiResponse<PlaceOrderResponse>,
            ApiResponse<OrderList>,
            ApiResponse<Order>,
            ApiResponse<PaymentOrderResponse>,
            ApiResponse<ProductList>,
            ApiResponse<Product>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "User", description = "Account state and profile endpoints"),
        (name = "Orders", description = "Checkout and order history endpoints"),
        (name = "Payment", description = "Payment gateway endpoints"),
        (name = "Products", description = "Catalog endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
