//! Node type names resolved to the shape they emit.
//!
//! Canonical component names and their HTML-compatible aliases map to the same
//! kind, so the emitter never matches on strings.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    // Surfaces
    Blocks,
    Modal,
    Home,
    // Layout blocks
    Section,
    Divider,
    Image,
    Header,
    Actions,
    Context,
    Input,
    File,
    // Section parts
    Field,
    Mrkdwn,
    // Interactive components
    Button,
    Select,
    ExternalSelect,
    UsersSelect,
    ConversationsSelect,
    ChannelsSelect,
    Overflow,
    DatePicker,
    TimePicker,
    CheckboxGroup,
    RadioButtonGroup,
    Textarea,
    // Composition parts
    OptionItem,
    OptionGroup,
    OverflowItem,
    Checkbox,
    RadioButton,
    Confirm,
    /// Any markup tag or text; rendered into text payloads.
    Markup,
}

impl BlockKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "Blocks" => Self::Blocks,
            "Modal" => Self::Modal,
            "Home" => Self::Home,
            "Section" | "section" => Self::Section,
            "Divider" | "hr" => Self::Divider,
            "Image" | "img" => Self::Image,
            "Header" | "header" => Self::Header,
            "Actions" => Self::Actions,
            "Context" => Self::Context,
            "Input" => Self::Input,
            "File" => Self::File,
            "Field" => Self::Field,
            "Mrkdwn" => Self::Mrkdwn,
            "Button" | "button" => Self::Button,
            "Select" | "select" => Self::Select,
            "ExternalSelect" => Self::ExternalSelect,
            "UsersSelect" => Self::UsersSelect,
            "ConversationsSelect" => Self::ConversationsSelect,
            "ChannelsSelect" => Self::ChannelsSelect,
            "Overflow" => Self::Overflow,
            "DatePicker" => Self::DatePicker,
            "TimePicker" => Self::TimePicker,
            "CheckboxGroup" => Self::CheckboxGroup,
            "RadioButtonGroup" => Self::RadioButtonGroup,
            "Textarea" | "textarea" => Self::Textarea,
            "Option" | "option" => Self::OptionItem,
            "Optgroup" | "optgroup" => Self::OptionGroup,
            "OverflowItem" => Self::OverflowItem,
            "Checkbox" => Self::Checkbox,
            "RadioButton" => Self::RadioButton,
            "Confirm" => Self::Confirm,
            "#text" | "a" | "b" | "strong" | "i" | "em" | "s" | "strike" | "del" | "code"
            | "br" | "time" | "p" | "blockquote" | "pre" | "ul" | "ol" | "li" => Self::Markup,
            _ => return None,
        };
        Some(kind)
    }

    /// Block elements: legal in `Actions`, as a section accessory, or as the
    /// element of an `Input`.
    pub fn is_interactive(self) -> bool {
        matches!(
            self,
            Self::Button
                | Self::Select
                | Self::ExternalSelect
                | Self::UsersSelect
                | Self::ConversationsSelect
                | Self::ChannelsSelect
                | Self::Overflow
                | Self::DatePicker
                | Self::TimePicker
                | Self::CheckboxGroup
                | Self::RadioButtonGroup
                | Self::Textarea
        )
    }

    pub fn is_markup(self) -> bool {
        self == Self::Markup
    }
}
