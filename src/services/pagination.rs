use sea_orm::{
    ConnectionTrait, EntityTrait, ItemsAndPagesNumber, Order, PaginatorTrait, QueryOrder, Select,
};

use crate::errors::AppResult;
use crate::models::dto::{Page, PageParams};

/// Applique sortBy/sortDir ; une colonne inconnue retombe sur `default`
pub fn sorted<E: EntityTrait>(
    query: Select<E>,
    params: &PageParams,
    resolve: impl Fn(&str) -> Option<E::Column>,
    default: E::Column,
) -> Select<E> {
    let column = params
        .sort_by
        .as_deref()
        .and_then(|name| resolve(name))
        .unwrap_or(default);

    let order = if params.is_desc() { Order::Desc } else { Order::Asc };
    query.order_by(column, order)
}

/// Exécute la requête page par page (page 0-based)
pub async fn fetch_page<C, E>(db: &C, query: Select<E>, params: &PageParams) -> AppResult<Page<E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: Sync,
{
    let size = params.size();
    let number = params.page();

    let paginator = query.paginate(db, size);
    let ItemsAndPagesNumber {
        number_of_items,
        number_of_pages,
    } = paginator.num_items_and_pages().await?;
    let content = paginator.fetch_page(number).await?;

    Ok(Page::new(content, number_of_items, number_of_pages, size, number))
}
