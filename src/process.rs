//! Pipeline actions: look an order up, bill it, write the output file, and
//! optionally persist results to blob storage.

use std::path::Path;

use log::info;
use serde_json::{json, Value};

use crate::cli::{Action, CliArgs};
use crate::error_handling::types::ProcessError;
use crate::fsutil;
use crate::instrument::traced_async;
use crate::orders::{self, OrderData};
use crate::storage::client::{ACCOUNT_NAME_VAR, CONTAINER_NAME_VAR};
use crate::storage::{AccessOptions, BlobStore, Payload};

/// Saves `data` to storage and records where it landed in the output.
async fn upload_output(
    store: &BlobStore,
    data: &Payload,
    path: &str,
    output: &mut Value,
) -> Result<(), ProcessError> {
    store.save_file(path, data, &AccessOptions::default()).await?;

    let account = std::env::var(ACCOUNT_NAME_VAR).unwrap_or_default();
    let container = std::env::var(CONTAINER_NAME_VAR).unwrap_or_default();
    output["storage_container"] = json!(container);
    output["storage_path"] = json!(path);
    info!("file saved on {}/{}/{}", account, container, path);
    Ok(())
}

/// Looks up the order for `order_id` and writes the pipeline output file.
pub async fn get_order_process(
    store: &BlobStore,
    order_id: &str,
    output_file: &str,
    upload: bool,
) -> Result<(), ProcessError> {
    traced_async("get_order_process", (order_id, output_file, upload), || async {
        let order = orders::get_order(order_id)?;
        info!("get_order for order {}: {:?}.", order_id, order);

        let mut output = json!({
            "order_id": order_id,
            "order": serde_json::to_string(&order)?,
        });

        if upload {
            let payload = Payload::Json(serde_json::to_value(&order)?);
            let path = format!("order/{}.json", order_id);
            upload_output(store, &payload, &path, &mut output).await?;
        }

        fsutil::save_json(Path::new(output_file), &output)?;
        info!("pipeline output saved to file: {}", output_file);
        Ok(())
    })
    .await
}

/// Bills the order described by `order_data` and writes the output file.
pub async fn get_bill_process(
    store: &BlobStore,
    order_data: &str,
    output_file: &str,
    upload: bool,
) -> Result<(), ProcessError> {
    traced_async("get_bill_process", (output_file, upload), || async {
        let (order_id, order) = OrderData::resolve(order_data, store).await?;

        let bill = orders::get_bill(&order)?;
        info!("get_bill for order {} - {:?}: £{}.", order_id, order, bill);

        let mut output = json!({
            "order_id": order_id,
            "bill": bill,
        });

        if upload {
            let payload = Payload::Text(format!("£{}", bill));
            let path = format!("bill/{}.txt", order_id);
            upload_output(store, &payload, &path, &mut output).await?;
        }

        fsutil::save_json(Path::new(output_file), &output)?;
        info!("pipeline output saved to file: {}", output_file);
        Ok(())
    })
    .await
}

/// Dispatches the validated CLI arguments to the selected action.
pub async fn run(args: &CliArgs, store: &BlobStore) -> Result<(), ProcessError> {
    match args.action {
        Action::GetOrder => {
            get_order_process(
                store,
                args.order_id.as_deref().unwrap_or_default(),
                &args.output_file,
                args.upload,
            )
            .await
        }
        Action::GetBill => {
            get_bill_process(
                store,
                args.order_data.as_deref().unwrap_or_default(),
                &args.output_file,
                args.upload,
            )
            .await
        }
    }
}
