use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::KeyboardEvent;

use crate::api::BackendClient;
use crate::chat::{
	BACKEND_FAILURE_TEXT, BotReply, CONNECTION_FAILURE_TEXT, ChatMessage, is_sendable,
	parse_structured_response, render_markdown,
};
use crate::config::AppConfig;
use crate::error::AppError;

fn message_view(message: ChatMessage) -> impl IntoView {
	let class = if message.from_user {
		"chat-message from-user"
	} else {
		"chat-message from-bot"
	};
	let body = match message.reply {
		BotReply::Plain(text) if message.from_user => {
			view! { <p class="chat-text">{text}</p> }.into_any()
		}
		BotReply::Plain(text) => {
			view! { <div class="chat-markdown" inner_html=render_markdown(&text)></div> }
				.into_any()
		}
		BotReply::Structured(pairs) => view! {
			<h4 class="chat-structured-title">"Related Topics:"</h4>
			<dl class="chat-structured">
				{pairs
					.into_iter()
					.map(|(key, value)| view! {
						<dt>{key}</dt>
						<dd>{value}</dd>
					})
					.collect_view()}
			</dl>
		}
		.into_any(),
	};
	view! { <div class=class>{body}</div> }
}

/// Chat with the graph: questions go to the backend, which answers from query results.
#[component]
pub fn Home() -> impl IntoView {
	let api = StoredValue::new(expect_context::<AppConfig>().api_base_url);
	let (input, set_input) = signal(String::new());
	let messages = RwSignal::new(Vec::<ChatMessage>::new());
	let waiting = RwSignal::new(false);
	let log_end = NodeRef::<leptos::html::Div>::new();

	Effect::new(move |_| {
		messages.track();
		if let Some(end) = log_end.get() {
			end.scroll_into_view();
		}
	});

	let send = move || {
		let question = input.get_untracked();
		if !is_sendable(&question) || waiting.get_untracked() {
			return;
		}
		messages.update(|m| m.push(ChatMessage::user(question.clone())));
		set_input.set(String::new());
		waiting.set(true);

		let client = BackendClient::new(&api.get_value());
		spawn_local(async move {
			let reply = match client.chat(&question).await {
				Ok(reply) => ChatMessage::bot(parse_structured_response(&reply.response)),
				Err(AppError::Backend { status, message }) => {
					log::warn!("chat failed with {status}: {message}");
					ChatMessage::bot_text(BACKEND_FAILURE_TEXT)
				}
				Err(err) => {
					log::error!("Error sending message: {err}");
					ChatMessage::bot_text(CONNECTION_FAILURE_TEXT)
				}
			};
			messages.update(|m| m.push(reply));
			waiting.set(false);
		});
	};

	view! {
		<div class="page chat">
			<div class="chat-log">
				{move || messages.get().into_iter().map(message_view).collect_view()}
				<Show when=move || waiting.get()>
					<p class="chat-pending">"Thinking..."</p>
				</Show>
				<div node_ref=log_end></div>
			</div>
			<div class="chat-input">
				<input
					type="text"
					placeholder="Type your message..."
					prop:value=input
					on:input=move |ev| set_input.set(event_target_value(&ev))
					on:keydown=move |ev: KeyboardEvent| {
						if ev.key() == "Enter" {
							send();
						}
					}
				/>
				<button on:click=move |_| send() disabled=move || waiting.get()>
					"Send"
				</button>
			</div>
		</div>
	}
}
