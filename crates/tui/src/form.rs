use gamehub_core::controller::NewGame;

const MAX_FIELD_LEN: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Url,
    Category,
    Description,
    Image,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Title,
        FormField::Url,
        FormField::Category,
        FormField::Description,
        FormField::Image,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Url => "URL",
            FormField::Category => "Category",
            FormField::Description => "Description",
            FormField::Image => "Image URL",
        }
    }
}

#[derive(Debug, Clone, Default)]
struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    fn move_cursor(&mut self, delta: isize) {
        let len = self.value.chars().count() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    fn insert(&mut self, ch: char) {
        if self.value.chars().count() >= MAX_FIELD_LEN || ch.is_control() {
            return;
        }
        let at = self.byte_index();
        self.value.insert(at, ch);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index();
            self.value.remove(at);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.value.chars().count() {
            let at = self.byte_index();
            self.value.remove(at);
        }
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(index, _)| index)
            .unwrap_or(self.value.len())
    }
}

/// Add-game modal: four text fields plus a category picker.
#[derive(Debug, Clone)]
pub struct AddGameForm {
    title: TextInput,
    url: TextInput,
    description: TextInput,
    image: TextInput,
    categories: Vec<String>,
    category: usize,
    focus: usize,
    error: Option<String>,
}

impl AddGameForm {
    pub fn new(categories: Vec<String>) -> Self {
        Self {
            title: TextInput::default(),
            url: TextInput::default(),
            description: TextInput::default(),
            image: TextInput::default(),
            categories,
            category: 0,
            focus: 0,
            error: None,
        }
    }

    pub fn focus(&self) -> FormField {
        FormField::ALL[self.focus]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FormField::ALL.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + FormField::ALL.len() - 1) % FormField::ALL.len();
    }

    /// Left/right: move the text cursor, or cycle the category.
    pub fn move_horizontal(&mut self, delta: isize) {
        if let Some(input) = self.input_mut() {
            input.move_cursor(delta);
        } else if !self.categories.is_empty() {
            let len = self.categories.len() as isize;
            self.category = (self.category as isize + delta).rem_euclid(len) as usize;
        }
    }

    pub fn insert(&mut self, ch: char) {
        if let Some(input) = self.input_mut() {
            input.insert(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(input) = self.input_mut() {
            input.backspace();
        }
    }

    pub fn delete(&mut self) {
        if let Some(input) = self.input_mut() {
            input.delete();
        }
    }

    pub fn set_error(&mut self, message: String) {
        self.error = Some(message);
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Displayed value of a field.
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Category => self.selected_category(),
            _ => self.input(field).map(|input| input.value.as_str()).unwrap_or(""),
        }
    }

    /// Cursor column within the focused field, if it takes text.
    pub fn cursor(&self) -> Option<usize> {
        self.input(self.focus()).map(|input| input.cursor)
    }

    pub fn to_new_game(&self) -> NewGame {
        NewGame {
            title: self.title.value.clone(),
            url: self.url.value.clone(),
            category: self.selected_category().to_string(),
            description: self.description.value.clone(),
            image: self.image.value.clone(),
        }
    }

    fn selected_category(&self) -> &str {
        self.categories
            .get(self.category)
            .map(String::as_str)
            .unwrap_or("")
    }

    fn input(&self, field: FormField) -> Option<&TextInput> {
        match field {
            FormField::Title => Some(&self.title),
            FormField::Url => Some(&self.url),
            FormField::Description => Some(&self.description),
            FormField::Image => Some(&self.image),
            FormField::Category => None,
        }
    }

    fn input_mut(&mut self) -> Option<&mut TextInput> {
        match self.focus() {
            FormField::Title => Some(&mut self.title),
            FormField::Url => Some(&mut self.url),
            FormField::Description => Some(&mut self.description),
            FormField::Image => Some(&mut self.image),
            FormField::Category => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(form: &mut AddGameForm, text: &str) {
        for ch in text.chars() {
            form.insert(ch);
        }
    }

    #[test]
    fn collects_fields_into_new_game() {
        let mut form = AddGameForm::new(vec!["Action".into(), "Puzzle".into()]);
        type_text(&mut form, "Snake");
        form.focus_next();
        type_text(&mut form, "https://snake.example.com");
        form.focus_next();
        assert_eq!(form.focus(), FormField::Category);
        assert_eq!(form.cursor(), None);
        form.move_horizontal(1);
        form.focus_next();
        type_text(&mut form, "Eat apples");

        let game = form.to_new_game();
        assert_eq!(game.title, "Snake");
        assert_eq!(game.url, "https://snake.example.com");
        assert_eq!(game.category, "Puzzle");
        assert_eq!(game.description, "Eat apples");
        assert!(game.image.is_empty());
    }

    #[test]
    fn editing_respects_cursor() {
        let mut form = AddGameForm::new(Vec::new());
        type_text(&mut form, "Tetrs");
        form.move_horizontal(-1);
        form.insert('i');
        assert_eq!(form.value(FormField::Title), "Tetris");
        form.move_horizontal(-10);
        form.delete();
        form.backspace();
        assert_eq!(form.value(FormField::Title), "etris");
        assert_eq!(form.cursor(), Some(0));
    }

    #[test]
    fn category_wraps_and_focus_cycles() {
        let mut form = AddGameForm::new(vec!["Action".into(), "Puzzle".into()]);
        form.focus_prev();
        assert_eq!(form.focus(), FormField::Image);
        form.focus_prev();
        form.focus_prev();
        assert_eq!(form.focus(), FormField::Category);
        form.move_horizontal(-1);
        assert_eq!(form.value(FormField::Category), "Puzzle");
        form.insert('x');
        assert_eq!(form.value(FormField::Category), "Puzzle");
    }
}
