use sea_orm::{EntityName, Schema};
use sea_orm_migration::prelude::*;

use crate::entity::{AuditLogs, CartItems, OrderItems, Orders, Products, cart_items, orders};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Tables are derived from the entities.
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(schema.create_table_from_entity(Products))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(CartItems))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(Orders))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(OrderItems))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(AuditLogs))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_cart_items_user_product")
                    .table(CartItems.table_ref())
                    .col(cart_items::Column::UserId)
                    .col(cart_items::Column::ProductId)
                    .unique()
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("ix_orders_user_created")
                    .table(Orders.table_ref())
                    .col(orders::Column::UserId)
                    .col(orders::Column::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditLogs.table_ref()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OrderItems.table_ref()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Orders.table_ref()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CartItems.table_ref()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Products.table_ref()).to_owned())
            .await?;
        Ok(())
    }
}
