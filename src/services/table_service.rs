// src/services/table_service.rs

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Luma};
use qrcode::QrCode;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::TableRepository,
    models::tables::{Table, TablePayload, UpdateTablePayload},
};

#[derive(Clone)]
pub struct TableService {
    repo: TableRepository,
    pool: PgPool,
    // Base pública usada nos links dos QR codes
    public_base_url: String,
}

impl TableService {
    pub fn new(repo: TableRepository, pool: PgPool, public_base_url: String) -> Self {
        Self {
            repo,
            pool,
            public_base_url,
        }
    }

    pub async fn list(&self) -> Result<Vec<Table>, AppError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: i64) -> Result<Table, AppError> {
        self.repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Table"))
    }

    pub async fn create(&self, payload: &TablePayload) -> Result<Table, AppError> {
        let table = self.repo.create(payload).await?;
        tracing::info!(table_id = table.id, table_number = table.table_number, "Table created");
        Ok(table)
    }

    pub async fn update(&self, id: i64, payload: &TablePayload) -> Result<Table, AppError> {
        self.repo
            .update(id, payload)
            .await?
            .ok_or_else(|| AppError::not_found("Table"))
    }

    pub async fn patch(&self, id: i64, patch: UpdateTablePayload) -> Result<Table, AppError> {
        let current = self.get(id).await?;
        let payload = patch.apply_to(&current);
        payload.validate()?;
        self.update(id, &payload).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found("Table"));
        }
        tracing::info!(table_id = id, "Table deleted");
        Ok(())
    }

    /// Libera a mesa: volta para `available` e carimba `closed_at`.
    /// Os pedidos dela não são tocados.
    pub async fn close_out(&self, id: i64) -> Result<Table, AppError> {
        let table = self
            .repo
            .close_out(id)
            .await?
            .ok_or_else(|| AppError::not_found("Table"))?;
        tracing::info!(table_id = id, "Table closed out");
        Ok(table)
    }

    pub fn order_page_url(&self, table_id: i64) -> String {
        order_page_url(&self.public_base_url, table_id)
    }

    /// PNG com o QR code que leva à página de pedido da mesa.
    pub async fn qr_png(&self, id: i64) -> Result<Vec<u8>, AppError> {
        let table = self.get(id).await?;
        render_qr_png(&self.order_page_url(table.id))
    }
}

pub fn order_page_url(base: &str, table_id: i64) -> String {
    format!("{}/order/?table={}", base.trim_end_matches('/'), table_id)
}

pub fn render_qr_png(data: &str) -> Result<Vec<u8>, AppError> {
    let code = QrCode::new(data.as_bytes()).map_err(|e| anyhow::anyhow!("Falha ao gerar QR Code: {}", e))?;

    // Renderiza para imagem
    let image_buffer = code.render::<Luma<u8>>().build();
    let dynamic_image = DynamicImage::ImageLuma8(image_buffer);

    let mut bytes = Cursor::new(Vec::new());
    dynamic_image
        .write_to(&mut bytes, ImageOutputFormat::Png)
        .map_err(|e| anyhow::anyhow!("Falha ao codificar PNG: {}", e))?;
    Ok(bytes.into_inner())
}
