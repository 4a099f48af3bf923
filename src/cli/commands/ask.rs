//! Ask and Suggest commands.

use crate::context::AppContext;
use crate::documents::DocumentId;

pub async fn run_ask(ctx: &AppContext, id: i64, question: &str) -> anyhow::Result<()> {
    if question.trim().is_empty() {
        anyhow::bail!("Question must not be empty");
    }
    let answer = ctx.answering.answer(DocumentId::new(id), question).await?;
    println!("{answer}");
    Ok(())
}

pub async fn run_suggest(ctx: &AppContext, id: i64) -> anyhow::Result<()> {
    let questions = ctx.answering.suggest(DocumentId::new(id)).await?;
    for question in questions {
        println!("{question}");
    }
    Ok(())
}
