//! Interactive session: one line of input is one user action.

use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::app::App;
use crate::backend::AnalysisBackend;
use crate::render::Presenter;

pub const HELP: &str = "\
comandos:
  arquivo <caminho>   seleciona o PDF
  tributos <termos>   termos a buscar (ex.: ICMS, ISS)
  analisar            envia o PDF para análise
  tributo [nome]      filtra por tributo (vazio = todos)
  empresa [texto]     filtra por empresa, linha ou contexto
  contexto <n>        mostra o contexto do resultado n
  exportar            salva os resultados filtrados em CSV
  avisos              lista os avisos visíveis
  fechar <id>         descarta um aviso
  ajuda               mostra esta ajuda
  sair                encerra";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    File(PathBuf),
    Terms(String),
    Analyze,
    Tributo(Option<String>),
    Empresa(String),
    Context(usize),
    Export,
    Notices,
    Dismiss(u64),
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("comando desconhecido: {0} (digite 'ajuda')")]
    Unknown(String),

    #[error("'{command}' precisa de {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },

    #[error("número inválido: {0}")]
    InvalidNumber(String),
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let required = |command: &'static str, what: &'static str| {
        if rest.is_empty() {
            Err(ParseError::MissingArgument { command, what })
        } else {
            Ok(rest)
        }
    };
    let number = |text: &str| {
        text.parse::<u64>()
            .map_err(|_| ParseError::InvalidNumber(text.to_string()))
    };

    let command = match word.to_lowercase().as_str() {
        "arquivo" => Command::File(PathBuf::from(required("arquivo", "um caminho")?)),
        "tributos" => Command::Terms(required("tributos", "os termos")?.to_string()),
        "analisar" => Command::Analyze,
        "tributo" => Command::Tributo(Some(rest).filter(|r| !r.is_empty()).map(str::to_string)),
        "empresa" => Command::Empresa(rest.to_string()),
        "contexto" => {
            let n = number(required("contexto", "o número do resultado")?)?;
            Command::Context(n as usize)
        }
        "exportar" => Command::Export,
        "avisos" => Command::Notices,
        "fechar" => Command::Dismiss(number(required("fechar", "o id do aviso")?)?),
        "ajuda" | "help" | "?" => Command::Help,
        "sair" | "exit" | "quit" => Command::Quit,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// Reads commands until `sair` or end of input.
pub async fn run<B, P, R>(app: &mut App<B, P>, input: R) -> std::io::Result<()>
where
    B: AnalysisBackend,
    P: Presenter,
    R: AsyncBufRead + Unpin,
{
    app.say(HELP);
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                app.say(&e.to_string());
                continue;
            }
        };
        debug!(?command, "shell command");
        if !dispatch(app, command).await {
            break;
        }
    }
    Ok(())
}

/// Applies one command. Returns false when the session should end.
pub async fn dispatch<B: AnalysisBackend, P: Presenter>(app: &mut App<B, P>, command: Command) -> bool {
    match command {
        Command::File(path) => {
            app.select_file(&path).await;
        }
        Command::Terms(terms) => app.set_terms(&terms),
        Command::Analyze => {
            app.submit_upload().await;
        }
        Command::Tributo(tributo) => app.change_tributo_filter(tributo.as_deref()),
        Command::Empresa(text) => app.change_empresa_filter(&text),
        Command::Context(index) => {
            app.show_context(index);
        }
        Command::Export => {
            app.export().await;
        }
        Command::Notices => {
            let listing: Vec<String> = app
                .visible_notices()
                .iter()
                .map(|notice| format!("#{} {notice}", notice.id))
                .collect();
            if listing.is_empty() {
                app.say("nenhum aviso");
            } else {
                app.say(&listing.join("\n"));
            }
        }
        Command::Dismiss(id) => {
            if !app.dismiss_notice(id) {
                app.say(&format!("aviso #{id} não existe"));
            }
        }
        Command::Help => app.say(HELP),
        Command::Quit => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(
            parse_command("arquivo /tmp/nota fiscal.pdf"),
            Ok(Some(Command::File(PathBuf::from("/tmp/nota fiscal.pdf"))))
        );
        assert_eq!(
            parse_command("tributos ICMS, ISS, PIS"),
            Ok(Some(Command::Terms("ICMS, ISS, PIS".into())))
        );
        assert_eq!(parse_command("  contexto 3 "), Ok(Some(Command::Context(3))));
        assert_eq!(parse_command("fechar 12"), Ok(Some(Command::Dismiss(12))));
        assert_eq!(parse_command("ANALISAR"), Ok(Some(Command::Analyze)));
    }

    #[test]
    fn empty_filter_arguments_clear_filters() {
        assert_eq!(parse_command("tributo"), Ok(Some(Command::Tributo(None))));
        assert_eq!(
            parse_command("tributo ICMS"),
            Ok(Some(Command::Tributo(Some("ICMS".into()))))
        );
        assert_eq!(parse_command("empresa"), Ok(Some(Command::Empresa(String::new()))));
    }

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn reports_bad_input() {
        assert_eq!(
            parse_command("voar"),
            Err(ParseError::Unknown("voar".into()))
        );
        assert!(matches!(
            parse_command("arquivo"),
            Err(ParseError::MissingArgument { command: "arquivo", .. })
        ));
        assert_eq!(
            parse_command("contexto um"),
            Err(ParseError::InvalidNumber("um".into()))
        );
    }

    #[tokio::test]
    async fn shell_output_goes_through_presenter() {
        use crate::backend::HttpBackend;
        use crate::render::TerminalPresenter;

        let dir = tempfile::tempdir().unwrap();
        let backend = HttpBackend::new(reqwest::Client::new(), "http://127.0.0.1:9");
        let mut app = App::new(backend, TerminalPresenter::new(Vec::new()), dir.path().to_path_buf());

        let input: &[u8] = b"voar\navisos\nexportar\navisos\nfechar 99\n";
        run(&mut app, input).await.unwrap();

        let written = app.presenter().written();
        assert!(written.contains("comando desconhecido: voar"));
        assert!(written.contains("nenhum aviso"));
        assert!(written.contains("#1 [aviso] Nenhum resultado para exportar."));
        assert!(written.contains("aviso #99 não existe"));
    }

    #[tokio::test]
    async fn run_stops_at_quit() {
        use crate::backend::HttpBackend;
        use crate::render::TerminalPresenter;

        let dir = tempfile::tempdir().unwrap();
        let backend = HttpBackend::new(reqwest::Client::new(), "http://127.0.0.1:9");
        let mut app = App::new(backend, TerminalPresenter::new(Vec::new()), dir.path().to_path_buf());

        let input: &[u8] = b"tributo ICMS\nexportar\nsair\narquivo nunca.pdf\n";
        run(&mut app, input).await.unwrap();

        assert!(app.selected().is_none());
        let written = app.presenter().written();
        assert!(written.starts_with(HELP));
        assert!(written.contains("[aviso] Nenhum resultado para exportar."));
        assert_eq!(
            app.visible_notices().last().map(|n| n.message.as_str()),
            Some("Nenhum resultado para exportar.")
        );
    }
}
