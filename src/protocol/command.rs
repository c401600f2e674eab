#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    ConfigGet,
    WebhookProbe,
    FilesAdd,
    FilesRemove,
    FormSet,
    FormReset,
    FormState,
    UploadSubmit,
    TranslateSubmit,
    TranslateFile,
    HistoryList,
    HistoryClear,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "config.get" => Command::ConfigGet,
            "webhook.probe" => Command::WebhookProbe,
            "files.add" => Command::FilesAdd,
            "files.remove" => Command::FilesRemove,
            "form.set" => Command::FormSet,
            "form.reset" => Command::FormReset,
            "form.state" => Command::FormState,
            "upload.submit" => Command::UploadSubmit,
            "translate.submit" => Command::TranslateSubmit,
            "translate.file" => Command::TranslateFile,
            "history.list" => Command::HistoryList,
            "history.clear" => Command::HistoryClear,
            _ => Command::Unknown,
        }
    }
}

impl Command {
    /// Lead-in shown before network and response failures of this command.
    pub fn error_context(self) -> &'static str {
        match self {
            Command::UploadSubmit => "Có lỗi xảy ra khi tạo QR code. ",
            Command::TranslateSubmit | Command::TranslateFile => "Có lỗi xảy ra khi dịch. ",
            Command::WebhookProbe => "Kiểm tra webhook thất bại. ",
            _ => "",
        }
    }
}
