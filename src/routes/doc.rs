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
    dto::{
        auth::{LoginRequest, LoginResponse, RefreshRequest},
        cart::{AddToCartRequest, CartView, EditCartRequest},
        credit::{
            CreditRequest, MerchantUid, PaymentInfo, PaymentKey, PaymentResult, RefundRequest,
        },
        members::{JoinRequest, UpdateMemberRequest},
        orders::{OrderCreated, OrderList, SingleOrderRequest, UpdateDeliveryRequest},
        products::{ProductList, RegisterProductRequest, UpdateProductRequest},
        reviews::{ReviewList, ReviewRequest},
    },
    entity::{
        members::{MemberGender, MemberRole},
        orders::OrderStatus,
        products::{ProductCategory, ProductStatus},
    },
    models::{
        CartLineView, MemberInfo, OrderDetail, OrderLineView, OrderSummary, PaymentSummary,
        ProductDetail, ProductSummary, Review,
    },
    response::{ApiResponse, Meta},
    routes::{auth, cart, credit, health, members, orders, params, products, reviews},
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
        auth::login,
        auth::refresh,
        auth::logout,
        members::join,
        members::member_info,
        members::update_member,
        products::list_products,
        products::get_product,
        products::register_product,
        products::update_product,
        cart::get_cart,
        cart::add_to_cart,
        cart::edit_cart,
        orders::list_orders,
        orders::get_order,
        orders::verify_order,
        orders::update_delivery,
        orders::create_single_order,
        orders::create_cart_order,
        credit::complete_payment,
        credit::refund,
        credit::payment_info,
        credit::merchant_uid,
        credit::payment_key,
        reviews::list_reviews,
        reviews::add_review,
        reviews::edit_review,
        reviews::delete_review
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            RefreshRequest,
            JoinRequest,
            UpdateMemberRequest,
            MemberInfo,
            MemberGender,
            MemberRole,
            RegisterProductRequest,
            UpdateProductRequest,
            ProductDetail,
            ProductSummary,
            ProductList,
            ProductCategory,
            ProductStatus,
            AddToCartRequest,
            EditCartRequest,
            CartView,
            CartLineView,
            SingleOrderRequest,
            UpdateDeliveryRequest,
            OrderCreated,
            OrderList,
            OrderSummary,
            OrderDetail,
            OrderLineView,
            OrderStatus,
            PaymentSummary,
            CreditRequest,
            RefundRequest,
            PaymentResult,
            PaymentInfo,
            MerchantUid,
            PaymentKey,
            ReviewRequest,
            ReviewList,
            Review,
            params::Pagination,
            params::ProductQuery,
            Meta,
            ApiResponse<ProductDetail>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<OrderList>,
            ApiResponse<OrderDetail>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Members", description = "Member endpoints"),
        (name = "Products", description = "Product endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Payment", description = "Payment and refund endpoints"),
        (name = "Reviews", description = "Review endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
