use uuid::Uuid;

use crate::domain::entities::{PostRecord, PostWrite};
use crate::domain::posts::{empty_to_none, validate_draft};
use crate::domain::slug::derive_slug;

use super::types::{EditorError, EditorField, EditorMode};

/// Form values held by one editor, exactly as the form shows them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub image_url: String,
    pub is_published: bool,
}

impl Draft {
    fn from_record(record: &PostRecord) -> Self {
        Self {
            title: record.title.clone(),
            slug: record.slug.clone(),
            excerpt: record.excerpt.clone().unwrap_or_default(),
            content: record.content.clone(),
            image_url: record.image_url.clone().unwrap_or_default(),
            is_published: record.is_published,
        }
    }

    fn to_write(&self, author_id: Option<Uuid>) -> PostWrite {
        PostWrite {
            title: self.title.clone(),
            slug: self.slug.clone(),
            excerpt: empty_to_none(&self.excerpt),
            content: self.content.clone(),
            image_url: empty_to_none(&self.image_url),
            is_published: self.is_published,
            author_id,
        }
    }
}

/// The single store call a submit resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitPlan {
    Insert(PostWrite),
    Update {
        id: Uuid,
        previous_slug: String,
        write: PostWrite,
    },
}

impl SubmitPlan {
    pub fn write(&self) -> &PostWrite {
        match self {
            Self::Insert(write) | Self::Update { write, .. } => write,
        }
    }
}

/// In-memory draft state for one post being created or edited.
#[derive(Debug, Clone)]
pub struct PostEditor {
    mode: EditorMode,
    draft: Draft,
    slug_follows_title: bool,
    in_flight: bool,
}

impl PostEditor {
    pub fn create() -> Self {
        Self {
            mode: EditorMode::Create,
            draft: Draft::default(),
            slug_follows_title: true,
            in_flight: false,
        }
    }

    /// Edit an existing post. The slug follows the title only when the stored
    /// slug is empty.
    pub fn edit(record: &PostRecord) -> Self {
        Self {
            mode: EditorMode::Edit {
                id: record.id,
                original_slug: record.slug.clone(),
            },
            draft: Draft::from_record(record),
            slug_follows_title: record.slug.is_empty(),
            in_flight: false,
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn slug_follows_title(&self) -> bool {
        self.slug_follows_title
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    pub fn set_title(&mut self, value: &str) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.draft.title = value.to_string();
        if self.slug_follows_title {
            self.draft.slug = derive_slug(value);
        }
        Ok(())
    }

    /// Direct slug edit: normalized through the deriver and ends auto-follow.
    pub fn set_slug(&mut self, value: &str) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.draft.slug = derive_slug(value);
        self.slug_follows_title = false;
        Ok(())
    }

    pub fn set_excerpt(&mut self, value: &str) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.draft.excerpt = value.to_string();
        Ok(())
    }

    pub fn set_content(&mut self, value: &str) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.draft.content = value.to_string();
        Ok(())
    }

    pub fn set_image_url(&mut self, value: &str) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.draft.image_url = value.to_string();
        Ok(())
    }

    pub fn set_published(&mut self, value: bool) -> Result<(), EditorError> {
        self.ensure_idle()?;
        self.draft.is_published = value;
        Ok(())
    }

    /// Apply one field edit coming from the form.
    pub fn apply(&mut self, field: EditorField, value: &str) -> Result<(), EditorError> {
        match field {
            EditorField::Title => self.set_title(value),
            EditorField::Slug => self.set_slug(value),
            EditorField::Excerpt => self.set_excerpt(value),
            EditorField::Content => self.set_content(value),
            EditorField::ImageUrl => self.set_image_url(value),
            EditorField::IsPublished => self.set_published(parse_flag(value)),
        }
    }

    /// Reconcile a full form post into the draft.
    ///
    /// The title goes first so auto-follow can run; the slug is applied only
    /// when the form changed it relative to what the editor held before.
    pub fn sync_form(&mut self, form: &Draft) -> Result<(), EditorError> {
        self.ensure_idle()?;
        let previous_slug = self.draft.slug.clone();
        if form.title != self.draft.title {
            self.set_title(&form.title)?;
        }
        if form.slug != previous_slug {
            self.set_slug(&form.slug)?;
        }
        self.set_excerpt(&form.excerpt)?;
        self.set_content(&form.content)?;
        self.set_image_url(&form.image_url)?;
        self.set_published(form.is_published)
    }

    /// Validate the draft and mark a submit as in flight.
    ///
    /// The caller performs the store call and must call [`finish_submit`]
    /// afterwards, whatever the outcome. The draft is never modified here.
    ///
    /// [`finish_submit`]: PostEditor::finish_submit
    pub fn begin_submit(&mut self, author_id: Option<Uuid>) -> Result<SubmitPlan, EditorError> {
        self.ensure_idle()?;
        validate_draft(&self.draft.title, &self.draft.slug, &self.draft.content)?;

        let write = self.draft.to_write(author_id);
        let plan = match &self.mode {
            EditorMode::Create => SubmitPlan::Insert(write),
            EditorMode::Edit { id, original_slug } => SubmitPlan::Update {
                id: *id,
                previous_slug: original_slug.clone(),
                write,
            },
        };
        self.in_flight = true;
        Ok(plan)
    }

    pub fn finish_submit(&mut self) {
        self.in_flight = false;
    }

    fn ensure_idle(&self) -> Result<(), EditorError> {
        if self.in_flight {
            Err(EditorError::Busy)
        } else {
            Ok(())
        }
    }
}

/// Checkbox values: present and not explicitly false.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "1" | "yes"
    )
}
