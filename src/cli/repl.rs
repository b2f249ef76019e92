use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::application::ChatSession;
use crate::domain::{DomainError, Turn};

pub const TITLE: &str = "🔬 Kids Science Helper";

pub const DESCRIPTION: &str = "아이들이 물어보는 과학 질문에 쉽게 답하고, 안전하고 호기심을 자극하는 방식으로 \
대화를 이어갑니다. 간단한 비유와 예시를 사용해 설명하며, 위험한 실험은 직접 안내하지 않고 성인 감독을 권장합니다.";

pub const HINT: &str = "아이들이 물어볼 과학 질문을 입력하세요. 예: '왜 하늘은 파래요?', '전기는 어떻게 만들어져요?'\n\
/clear 초기화 (Clear) · /history 대화 보기 · /quit 종료";

const PROMPT: &str = "궁금한 과학 질문을 입력하세요 > ";
const RESET_NOTICE: &str = "대화를 초기화했습니다.";

/// A single line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Question(String),
    Reset,
    History,
    Quit,
    Blank,
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "" => Input::Blank,
            "/clear" | "/reset" => Input::Reset,
            "/history" => Input::History,
            "/quit" | "/exit" => Input::Quit,
            _ => Input::Question(trimmed.to_string()),
        }
    }
}

pub fn render_turn(turn: &Turn) -> String {
    format!("{}: {}", turn.role(), turn.content())
}

pub fn render_error(error: &DomainError) -> String {
    format!("OpenAI API 요청 중 오류가 발생했습니다: {error}")
}

/// Runs the interactive loop until `/quit` or end of input.
///
/// Request failures are shown and the loop carries on; only I/O errors on
/// `input` or `output` end it early.
pub async fn run_chat<R, W>(
    session: &mut ChatSession,
    input: R,
    output: &mut W,
) -> Result<(), DomainError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    write_line(output, &format!("{TITLE}\n\n{DESCRIPTION}\n\n{HINT}\n")).await?;

    let mut lines = input.lines();
    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            debug!("End of input, closing session");
            write_line(output, "").await?;
            break;
        };

        match Input::parse(&line) {
            Input::Blank => continue,
            Input::Quit => break,
            Input::Reset => {
                session.reset();
                write_line(output, RESET_NOTICE).await?;
            }
            Input::History => {
                for turn in session.visible_turns() {
                    write_line(output, &render_turn(turn)).await?;
                }
            }
            Input::Question(question) => {
                ask(session, &question, output).await?;
            }
        }
    }

    Ok(())
}

/// One interaction cycle with its output. Returns whether an answer was
/// appended; request failures are rendered, not propagated.
pub async fn ask<W>(
    session: &mut ChatSession,
    question: &str,
    output: &mut W,
) -> Result<bool, DomainError>
where
    W: AsyncWrite + Unpin,
{
    let question = question.trim();
    if question.is_empty() {
        return Ok(false);
    }
    write_line(output, &render_turn(&Turn::user(question))).await?;

    match session.submit(question).await {
        Ok(reply) => {
            write_line(output, &render_turn(&Turn::assistant(reply.text))).await?;
            Ok(true)
        }
        Err(e) => {
            write_line(output, &render_error(&e)).await?;
            Ok(false)
        }
    }
}

async fn write_line<W>(output: &mut W, text: &str) -> Result<(), DomainError>
where
    W: AsyncWrite + Unpin,
{
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
