use std::time::Duration;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;
use wasm_bindgen_futures::JsFuture;
use web_sys::File;

use crate::api::{BackendClient, UploadReceipt};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

/// Delay before leaving for the graph display after a successful upload.
const REDIRECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadStatus {
	Idle,
	NoFile,
	Uploading,
	Uploaded,
	/// The backend answered but refused the document.
	Rejected,
	/// The request never completed.
	Failed,
}

impl UploadStatus {
	pub fn from_result(result: &AppResult<UploadReceipt>) -> Self {
		match result {
			Ok(_) => Self::Uploaded,
			Err(AppError::Backend { .. }) => Self::Rejected,
			Err(_) => Self::Failed,
		}
	}

	pub fn message(self) -> &'static str {
		match self {
			Self::Idle => "",
			Self::NoFile => "Please select a file to upload.",
			Self::Uploading => "Uploading...",
			Self::Uploaded => "File uploaded successfully!",
			Self::Rejected => "Failed to upload file.",
			Self::Failed => "An error occurred during file upload.",
		}
	}
}

async fn read_file(file: &File) -> AppResult<Vec<u8>> {
	let buffer = JsFuture::from(file.array_buffer()).await?;
	Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

/// Upload a text, PDF or Word document for the backend to turn into graph data.
#[component]
pub fn DatasetUpload() -> impl IntoView {
	let api = StoredValue::new(expect_context::<AppConfig>().api_base_url);
	let input_ref = NodeRef::<leptos::html::Input>::new();
	let selected = RwSignal::new(None::<String>);
	let status = RwSignal::new(UploadStatus::Idle);
	let navigate = use_navigate();

	let chosen_file = move || -> Option<File> { input_ref.get()?.files()?.get(0) };

	let on_change = move |_| {
		selected.set(chosen_file().map(|f| f.name()));
		status.set(UploadStatus::Idle);
	};

	let on_upload = move |_| {
		let Some(file) = chosen_file() else {
			status.set(UploadStatus::NoFile);
			return;
		};
		status.set(UploadStatus::Uploading);
		let client = BackendClient::new(&api.get_value());
		let navigate = navigate.clone();

		spawn_local(async move {
			let result = match read_file(&file).await {
				Ok(bytes) => client.upload(&file.name(), bytes, &file.type_()).await,
				Err(err) => Err(err),
			};
			match &result {
				Ok(receipt) => log::info!("Extracted text: {}", receipt.extracted_text),
				Err(err) => log::error!("Error uploading file: {err}"),
			}

			let outcome = UploadStatus::from_result(&result);
			status.set(outcome);
			if outcome == UploadStatus::Uploaded {
				if let Some(input) = input_ref.get_untracked() {
					input.set_value("");
				}
				selected.set(None);
				set_timeout(
					move || navigate("/kg-display", NavigateOptions::default()),
					REDIRECT_DELAY,
				);
			}
		});
	};

	view! {
		<div class="page dataset">
			<h1>"Upload Dataset"</h1>
			<p>"Upload a .txt, .pdf or .docx file to extend the knowledge graph."</p>
			<input
				type="file"
				node_ref=input_ref
				accept=".txt,.pdf,.docx"
				on:change=on_change
			/>
			<p class="selected-file">
				{move || selected.get().map(|name| format!("Selected: {name}"))}
			</p>
			<button
				on:click=on_upload
				disabled=move || status.get() == UploadStatus::Uploading
			>
				"Upload"
			</button>
			<Show when=move || status.get() == UploadStatus::Uploading>
				<progress></progress>
			</Show>
			<p class="upload-status">{move || status.get().message()}</p>
		</div>
	}
}
