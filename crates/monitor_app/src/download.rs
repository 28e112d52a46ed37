use std::path::{Path, PathBuf};

use monitor_core::{JobHandle, Platform};
use monitor_engine::{result_filename, AtomicFileWriter, DownloadError, ReqwestJobClient};
use monitor_logging::monitor_info;

/// Fetches the result file of a completed job and stores it in `output_dir`.
pub async fn save_result(
    client: &ReqwestJobClient,
    handle: &JobHandle,
    platform: Platform,
    output_dir: &Path,
) -> Result<PathBuf, DownloadError> {
    let file = client.download(handle).await?;
    let filename = result_filename(file.suggested_name.as_deref(), platform.as_str(), handle);

    let writer = AtomicFileWriter::new(output_dir.to_path_buf());
    let path = writer.write(&filename, &file.bytes)?;
    monitor_info!(
        "Saved {} bytes of results for job {} to {:?}",
        file.bytes.len(),
        handle,
        path
    );
    Ok(path)
}
