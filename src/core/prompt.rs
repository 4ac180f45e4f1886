use anyhow::Result;
use dialoguer::{Confirm, Input};

/// 대화형 입력 창구. 복구 과정은 이 트레이트를 통해서만 사용자 입력을 받는다.
pub trait Prompter {
    /// 메뉴 선택 입력을 그대로 돌려준다. 숫자 검증은 호출하는 쪽에서 한다.
    fn choice(&mut self, prompt: &str) -> Result<String>;
    /// 한 줄 텍스트를 입력받는다. 빈 문자열이 올 수 있다.
    fn text(&mut self, prompt: &str) -> Result<String>;
    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool>;
}

/// 터미널용 dialoguer 구현.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn choice(&mut self, prompt: &str) -> Result<String> {
        let value: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(value)
    }

    fn text(&mut self, prompt: &str) -> Result<String> {
        let value: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(value.trim().to_string())
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> Result<bool> {
        Ok(Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()?)
    }
}
