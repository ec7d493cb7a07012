use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::core::AppConfig;
use crate::forwarder::{ConversationHistory, Forwarder, InboundRequest};

pub async fn run(config: AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let forwarder = Forwarder::new(&config)?;

    // The provider is stateless so the history is carried here and
    // sent along with every message.
    let mut history = ConversationHistory::new();

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                let request = InboundRequest::new(&line, history.clone());
                match forwarder.forward(request, None).await {
                    Ok(outcome) => {
                        println!("{}", outcome.response);
                        history = outcome.conversation_history;
                    }
                    Err(err) => println!("Error: {}", err),
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
