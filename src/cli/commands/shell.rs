//! Interactive shell: a read-eval loop over the four views, driving the
//! view router the same way the windowed UI would.

use std::io::{BufRead, Write};

use crate::app::{App, Screen, ViewName};
use crate::cli::commands::{dashboard, finance, portfolio, trading};
use crate::cli::{CliContext, OutputFormat};
use crate::records::Month;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = CliContext::connect().await?;
    ctx.require_session()?;

    let mut app = App::new(ctx.sessions.clone());
    println!("finboard shell — views: portfolio, finance, trading; back, refresh, quit");
    render_active(&ctx, &output_format, &app).await?;

    let stdin = std::io::stdin();
    loop {
        print!("finboard:{}> ", app.router.active().as_str());
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else { continue };

        match command {
            "quit" | "exit" => break,
            "back" | "main" => {
                app.back();
                render_active(&ctx, &output_format, &app).await?;
            }
            "refresh" => {
                render_active(&ctx, &output_format, &app).await?;
            }
            "help" => {
                println!("commands: portfolio | finance | trading | back | refresh | quit");
            }
            other => match other.parse::<ViewName>() {
                Ok(view) => {
                    app.navigate(view);
                    render_active(&ctx, &output_format, &app).await?;
                }
                Err(_) => {
                    println!("unknown command '{}'; try 'help'", other);
                }
            },
        }
    }

    Ok(())
}

async fn render_active(
    ctx: &CliContext,
    output_format: &OutputFormat,
    app: &App,
) -> anyhow::Result<()> {
    match app.active_screen() {
        Screen::Main => dashboard::render(ctx, output_format).await,
        Screen::Portfolio => portfolio::render(ctx, output_format).await,
        Screen::Finance => finance::render(ctx, output_format, Month::current()).await,
        Screen::Trading => trading::render(ctx, output_format).await,
        // The shell is only reachable with an active session, but the
        // session can expire mid-loop
        Screen::Login | Screen::Loading => {
            anyhow::bail!("session is no longer active; run `finboard auth login`")
        }
    }
}
