use std::sync::Arc;

use legal_chat_widget::ui::terminal::{InputCommand, TerminalView, parse_command};
use legal_chat_widget::{ChatConfig, ChatWidget, TransitionError, WebhookClient, WidgetEvent};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "legal_chat_widget=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ChatConfig::from_env()?;
    let client = Arc::new(WebhookClient::new(&config)?);
    let view = TerminalView::stdout(config.quick_replies.clone());
    let mut widget = ChatWidget::init(config.clone(), client.clone(), view)?;

    client.probe(&config, widget.session().id()).await;
    widget.schedule_welcome();
    widget.view_mut().print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let event = match parse_command(&line) {
                    InputCommand::Quit => break,
                    InputCommand::Help => {
                        widget.view_mut().print_help();
                        continue;
                    }
                    InputCommand::Diagnose => {
                        let diagnosis = widget.diagnose().await;
                        println!("{}", serde_json::to_string_pretty(&diagnosis)?);
                        continue;
                    }
                    InputCommand::Unknown(cmd) => {
                        widget.view_mut().notice(&format!("unknown command {cmd}, try /help"));
                        continue;
                    }
                    InputCommand::Submit(text) => WidgetEvent::UserSubmitted { text },
                    InputCommand::Suggest(index) => WidgetEvent::SuggestionChosen { index },
                    InputCommand::Open => WidgetEvent::OpenRequested,
                    InputCommand::Close => WidgetEvent::CloseRequested,
                    InputCommand::Toggle => WidgetEvent::ToggleRequested,
                    InputCommand::Clear => WidgetEvent::ClearRequested,
                };
                match widget.dispatch(event) {
                    Ok(()) | Err(TransitionError::EmptyMessage) => {}
                    Err(TransitionError::AwaitingReply) => {
                        widget.view_mut().notice("espera la respuesta antes de enviar otro mensaje");
                    }
                    Err(e) => widget.view_mut().notice(&e.to_string()),
                }
            }
            Some(event) = widget.next_event() => {
                if let Err(e) = widget.dispatch(event) {
                    debug!(error = %e, "background event ignored");
                }
            }
        }
    }

    Ok(())
}
