use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::products::ProductList,
    error::{AppError, AppResult},
    models::Product,
    response::{ApiResponse, Meta},
    routes::params::{Pagination, ProductFilter, ProductSortBy, SortOrder},
};

pub async fn list_products(
    pool: &DbPool,
    pagination: Pagination,
    filter: ProductFilter,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = pagination.normalize();
    let sort_by = filter.sort_by.unwrap_or(ProductSortBy::CreatedAt);
    let sort_order = filter.sort_order.unwrap_or(SortOrder::Desc);

    // Sort columns come from a fixed whitelist, never from raw input.
    let sql = format!(
        r#"
        SELECT * FROM products
        WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR category = $2)
        ORDER BY {} {}
        LIMIT $3 OFFSET $4
        "#,
        sort_by.as_sql(),
        sort_order.as_sql()
    );

    let items = sqlx::query_as::<_, Product>(&sql)
        .bind(&filter.q)
        .bind(&filter.category)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let total: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM products
        WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR category = $2)
        "#,
    )
    .bind(&filter.q)
    .bind(&filter.category)
    .fetch_one(pool)
    .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(pool: &DbPool, id: Uuid) -> AppResult<ApiResponse<Product>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    Ok(ApiResponse::success("OK", product, Some(Meta::empty())))
}
