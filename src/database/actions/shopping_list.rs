use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::{Pool, Postgres};

use crate::{error::ApiError, schema::CartPart};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListLine {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

/// Every ingredient line of every recipe in the user's cart.
pub async fn fetch_cart_parts(
    user_id: i32,
    pool: &Pool<Postgres>,
) -> Result<Vec<CartPart>, ApiError> {
    let rows: Vec<CartPart> = sqlx::query_as(
        "
        SELECT i.name, i.measurement_unit, ri.amount
        FROM shopping_cart c
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE c.user_id = $1
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Sums amounts per exact (name, unit) pair, ordered by name then unit.
pub fn aggregate<I>(parts: I) -> Vec<ShoppingListLine>
where
    I: IntoIterator<Item = CartPart>,
{
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    for part in parts {
        *totals
            .entry((part.name, part.measurement_unit))
            .or_insert(0) += i64::from(part.amount);
    }

    totals
        .into_iter()
        .map(|((name, measurement_unit), total_amount)| ShoppingListLine {
            name,
            measurement_unit,
            total_amount,
        })
        .collect()
}

pub fn render(lines: &[ShoppingListLine]) -> String {
    lines
        .iter()
        .map(|line| {
            format!(
                "{} ({}) - {}",
                line.name, line.measurement_unit, line.total_amount
            )
        })
        .collect::<Vec<String>>()
        .join("\n")
}

/// The downloadable shopping list of `user_id`; empty when the cart is.
pub async fn shopping_list(user_id: i32, pool: &Pool<Postgres>) -> Result<String, ApiError> {
    let parts = fetch_cart_parts(user_id, pool).await?;
    let lines = aggregate(parts);

    log::debug!("Shopping list of user {user_id} has {} lines", lines.len());
    Ok(render(&lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(name: &str, unit: &str, amount: i32) -> CartPart {
        CartPart {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    #[test]
    fn empty_cart_renders_nothing() {
        let lines = aggregate(vec![]);
        assert!(lines.is_empty());
        assert_eq!(render(&lines), "");
    }

    #[test]
    fn sums_matching_name_and_unit() {
        let lines = aggregate(vec![part("egg", "pcs", 2), part("egg", "pcs", 3)]);
        assert_eq!(render(&lines), "egg (pcs) - 5");
    }

    #[test]
    fn keeps_units_and_case_apart() {
        let lines = aggregate(vec![
            part("flour", "g", 200),
            part("flour", "kg", 1),
            part("Flour", "g", 50),
        ]);
        assert_eq!(lines.len(), 3);
        assert_eq!(render(&lines), "Flour (g) - 50\nflour (g) - 200\nflour (kg) - 1");
    }

    #[test]
    fn order_of_recipes_does_not_matter() {
        let first = vec![part("egg", "pcs", 2), part("milk", "ml", 200)];
        let second = vec![part("milk", "ml", 100), part("sugar", "g", 10), part("egg", "pcs", 3)];

        let forward = aggregate(first.iter().chain(second.iter()).cloned());
        let backward = aggregate(second.iter().chain(first.iter()).cloned());
        assert_eq!(forward, backward);
        assert_eq!(
            render(&forward),
            "egg (pcs) - 5\nmilk (ml) - 300\nsugar (g) - 10"
        );
    }

    #[test]
    fn totals_do_not_overflow_amounts() {
        let lines = aggregate(vec![part("salt", "g", i32::MAX), part("salt", "g", i32::MAX)]);
        assert_eq!(lines[0].total_amount, 2 * i64::from(i32::MAX));
    }
}
