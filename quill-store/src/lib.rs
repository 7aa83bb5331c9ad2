//! SQLite persistence for clips, feedback, analyses, and style guides.
//!
//! Ids are UUIDv4 strings and timestamps are RFC 3339 UTC strings, both
//! assigned here on insert. List-valued and map-valued fields (tags,
//! based_on_clip_ids, patterns, style_elements) are stored as JSON text
//! columns. At most one style guide row has `is_active = 1`; the insert
//! path enforces that inside a single transaction.

use anyhow::{Context, Result};
use chrono::Utc;
use quill_common::model::{Analysis, AnalysisType, Clip, ContentType, Feedback, StyleGuide};
use serde_json::Value;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Fields accepted when creating a clip. Everything else is assigned by the
/// store.
#[derive(Debug, Clone)]
pub struct NewClip {
    pub content_type: ContentType,
    pub content: String,
    pub source_url: Option<String>,
    pub source_author: Option<String>,
    pub source_publication: Option<String>,
    pub user_notes: String,
    pub tags: Vec<String>,
    pub raw_html: Option<String>,
}

/// Partial update for a clip; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ClipUpdate {
    pub content: Option<String>,
    pub user_notes: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct NewFeedback {
    pub my_text: String,
    pub editor_feedback: String,
    pub context: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FeedbackUpdate {
    pub my_text: Option<String>,
    pub editor_feedback: Option<String>,
    pub context: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub clip_id: String,
    pub analysis_type: AnalysisType,
    pub patterns: Value,
    pub style_elements: Value,
    pub claude_response: String,
}

#[derive(Debug, Clone)]
pub struct NewStyleGuide {
    pub title: String,
    pub content: String,
    pub based_on_clip_ids: Vec<String>,
}

/// Partial update for a style guide; `updated_at` is touched whenever any
/// field changes.
#[derive(Debug, Clone, Default)]
pub struct StyleGuideUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub is_active: Option<bool>,
}

/// Filters for listing clips. Both filters are conjunctive.
#[derive(Debug, Clone, Default)]
pub struct ClipFilter {
    pub content_type: Option<ContentType>,
    /// Clip must carry every listed tag.
    pub tags: Vec<String>,
}

#[derive(Clone)]
pub struct StyleStore {
    pool: SqlitePool,
}

impl StyleStore {
    /// Connect to the database at `url` and make sure the schema exists.
    pub async fn connect(url: &str) -> Result<Self> {
        tracing::debug!(url = %url, "store.connect");
        let pool = SqlitePool::connect(url)
            .await
            .with_context(|| format!("failed to open database: {url}"))?;
        let store = Self { pool };
        store.init_tables().await?;
        Ok(store)
    }

    /// Wrap an existing pool (tests).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.init_tables().await?;
        Ok(store)
    }

    async fn init_tables(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clips (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                content_type TEXT NOT NULL,
                content TEXT NOT NULL,
                source_url TEXT,
                source_author TEXT,
                source_publication TEXT,
                user_notes TEXT NOT NULL DEFAULT '',
                tags TEXT NOT NULL DEFAULT '[]',
                raw_html TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feedback (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                my_text TEXT NOT NULL,
                editor_feedback TEXT NOT NULL,
                context TEXT,
                tags TEXT NOT NULL DEFAULT '[]'
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS analyses (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                clip_id TEXT NOT NULL,
                analysis_type TEXT NOT NULL,
                patterns TEXT NOT NULL DEFAULT '{}',
                style_elements TEXT NOT NULL DEFAULT '{}',
                claude_response TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS style_guides (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                based_on_clip_ids TEXT NOT NULL DEFAULT '[]',
                is_active INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        tracing::info!("store.tables_initialized");
        Ok(())
    }

    /// Cheap liveness probe for health reporting.
    pub async fn probe(&self) -> Result<()> {
        sqlx::query("SELECT id FROM clips LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(())
    }

    // ---- clips ----

    pub async fn list_clips(&self, filter: &ClipFilter) -> Result<Vec<Clip>> {
        let rows = match filter.content_type {
            Some(ct) => {
                sqlx::query(
                    r#"SELECT id, created_at, content_type, content, source_url,
                              source_author, source_publication, user_notes, tags, raw_html
                       FROM clips WHERE content_type = ? ORDER BY created_at DESC"#,
                )
                .bind(ct.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"SELECT id, created_at, content_type, content, source_url,
                              source_author, source_publication, user_notes, tags, raw_html
                       FROM clips ORDER BY created_at DESC"#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut clips = Vec::with_capacity(rows.len());
        for row in rows {
            clips.push(clip_from_row(&row)?);
        }
        // Tag filtering happens here rather than in SQL; tags live in a JSON
        // text column and the lists stay small.
        if !filter.tags.is_empty() {
            clips.retain(|c| filter.tags.iter().all(|t| c.tags.contains(t)));
        }
        Ok(clips)
    }

    pub async fn get_clip(&self, id: &str) -> Result<Option<Clip>> {
        let row = sqlx::query(
            r#"SELECT id, created_at, content_type, content, source_url,
                      source_author, source_publication, user_notes, tags, raw_html
               FROM clips WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| clip_from_row(&r)).transpose()
    }

    pub async fn create_clip(&self, new: NewClip) -> Result<Clip> {
        let clip = Clip {
            id: Uuid::new_v4().to_string(),
            created_at: now_rfc3339(),
            content_type: new.content_type,
            content: new.content,
            source_url: new.source_url,
            source_author: new.source_author,
            source_publication: new.source_publication,
            user_notes: new.user_notes,
            tags: new.tags,
            raw_html: new.raw_html,
        };

        let res = sqlx::query(
            r#"INSERT INTO clips
               (id, created_at, content_type, content, source_url, source_author,
                source_publication, user_notes, tags, raw_html)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
        )
        .bind(&clip.id)
        .bind(&clip.created_at)
        .bind(clip.content_type.as_str())
        .bind(&clip.content)
        .bind(&clip.source_url)
        .bind(&clip.source_author)
        .bind(&clip.source_publication)
        .bind(&clip.user_notes)
        .bind(serde_json::to_string(&clip.tags)?)
        .bind(&clip.raw_html)
        .execute(&self.pool)
        .await?;
        tracing::info!(
            clip_id = %clip.id,
            content_type = clip.content_type.as_str(),
            rows = res.rows_affected(),
            "store.create_clip"
        );
        Ok(clip)
    }

    /// Apply a partial update. Returns the updated clip, or `None` if the id
    /// does not exist.
    pub async fn update_clip(&self, id: &str, update: ClipUpdate) -> Result<Option<Clip>> {
        let Some(mut clip) = self.get_clip(id).await? else {
            return Ok(None);
        };
        if let Some(content) = update.content {
            clip.content = content;
        }
        if let Some(notes) = update.user_notes {
            clip.user_notes = notes;
        }
        if let Some(tags) = update.tags {
            clip.tags = tags;
        }

        sqlx::query(r#"UPDATE clips SET content = ?1, user_notes = ?2, tags = ?3 WHERE id = ?4"#)
            .bind(&clip.content)
            .bind(&clip.user_notes)
            .bind(serde_json::to_string(&clip.tags)?)
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!(clip_id = %id, "store.update_clip");
        Ok(Some(clip))
    }

    /// Returns true if a row was deleted.
    pub async fn delete_clip(&self, id: &str) -> Result<bool> {
        let res = sqlx::query("DELETE FROM clips WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!(clip_id = %id, rows = res.rows_affected(), "store.delete_clip");
        Ok(res.rows_affected() > 0)
    }

    // ---- feedback ----

    pub async fn list_feedback(&self) -> Result<Vec<Feedback>> {
        let rows = sqlx::query(
            r#"SELECT id, created_at, my_text, editor_feedback, context, tags
               FROM feedback ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(feedback_from_row).collect()
    }

    pub async fn get_feedback(&self, id: &str) -> Result<Option<Feedback>> {
        let row = sqlx::query(
            r#"SELECT id, created_at, my_text, editor_feedback, context, tags
               FROM feedback WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(feedback_from_row).transpose()
    }

    pub async fn create_feedback(&self, new: NewFeedback) -> Result<Feedback> {
        let fb = Feedback {
            id: Uuid::new_v4().to_string(),
            created_at: now_rfc3339(),
            my_text: new.my_text,
            editor_feedback: new.editor_feedback,
            context: new.context,
            tags: new.tags,
        };
        sqlx::query(
            r#"INSERT INTO feedback (id, created_at, my_text, editor_feedback, context, tags)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
        )
        .bind(&fb.id)
        .bind(&fb.created_at)
        .bind(&fb.my_text)
        .bind(&fb.editor_feedback)
        .bind(&fb.context)
        .bind(serde_json::to_string(&fb.tags)?)
        .execute(&self.pool)
        .await?;
        tracing::info!(feedback_id = %fb.id, "store.create_feedback");
        Ok(fb)
    }

    pub async fn update_feedback(
        &self,
        id: &str,
        update: FeedbackUpdate,
    ) -> Result<Option<Feedback>> {
        let Some(mut fb) = self.get_feedback(id).await? else {
            return Ok(None);
        };
        if let Some(text) = update.my_text {
            fb.my_text = text;
        }
        if let Some(editor) = update.editor_feedback {
            fb.editor_feedback = editor;
        }
        if let Some(context) = update.context {
            fb.context = Some(context);
        }
        if let Some(tags) = update.tags {
            fb.tags = tags;
        }

        sqlx::query(
            r#"UPDATE feedback SET my_text = ?1, editor_feedback = ?2, context = ?3, tags = ?4
               WHERE id = ?5"#,
        )
        .bind(&fb.my_text)
        .bind(&fb.editor_feedback)
        .bind(&fb.context)
        .bind(serde_json::to_string(&fb.tags)?)
        .bind(id)
        .execute(&self.pool)
        .await?;
        tracing::info!(feedback_id = %id, "store.update_feedback");
        Ok(Some(fb))
    }

    pub async fn delete_feedback(&self, id: &str) -> Result<bool> {
        let res = sqlx::query("DELETE FROM feedback WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!(feedback_id = %id, rows = res.rows_affected(), "store.delete_feedback");
        Ok(res.rows_affected() > 0)
    }

    // ---- analyses ----

    /// List analyses newest-first, optionally narrowed to one clip.
    pub async fn list_analyses(&self, clip_id: Option<&str>) -> Result<Vec<Analysis>> {
        let rows = match clip_id {
            Some(id) => {
                sqlx::query(
                    r#"SELECT id, created_at, clip_id, analysis_type, patterns, style_elements,
                              claude_response
                       FROM analyses WHERE clip_id = ? ORDER BY created_at DESC"#,
                )
                .bind(id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"SELECT id, created_at, clip_id, analysis_type, patterns, style_elements,
                              claude_response
                       FROM analyses ORDER BY created_at DESC"#,
                )
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.iter().map(analysis_from_row).collect()
    }

    pub async fn create_analysis(&self, new: NewAnalysis) -> Result<Analysis> {
        let analysis = Analysis {
            id: Uuid::new_v4().to_string(),
            created_at: now_rfc3339(),
            clip_id: new.clip_id,
            analysis_type: new.analysis_type,
            patterns: new.patterns,
            style_elements: new.style_elements,
            claude_response: new.claude_response,
        };
        sqlx::query(
            r#"INSERT INTO analyses
               (id, created_at, clip_id, analysis_type, patterns, style_elements, claude_response)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
        )
        .bind(&analysis.id)
        .bind(&analysis.created_at)
        .bind(&analysis.clip_id)
        .bind(analysis.analysis_type.as_str())
        .bind(serde_json::to_string(&analysis.patterns)?)
        .bind(serde_json::to_string(&analysis.style_elements)?)
        .bind(&analysis.claude_response)
        .execute(&self.pool)
        .await?;
        tracing::info!(
            analysis_id = %analysis.id,
            analysis_type = analysis.analysis_type.as_str(),
            "store.create_analysis"
        );
        Ok(analysis)
    }

    // ---- style guides ----

    pub async fn active_style_guide(&self) -> Result<Option<StyleGuide>> {
        let row = sqlx::query(
            r#"SELECT id, created_at, updated_at, title, content, based_on_clip_ids, is_active
               FROM style_guides WHERE is_active = 1 ORDER BY created_at DESC LIMIT 1"#,
        )
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(style_guide_from_row).transpose()
    }

    pub async fn all_style_guides(&self) -> Result<Vec<StyleGuide>> {
        let rows = sqlx::query(
            r#"SELECT id, created_at, updated_at, title, content, based_on_clip_ids, is_active
               FROM style_guides ORDER BY created_at DESC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(style_guide_from_row).collect()
    }

    pub async fn get_style_guide(&self, id: &str) -> Result<Option<StyleGuide>> {
        let row = sqlx::query(
            r#"SELECT id, created_at, updated_at, title, content, based_on_clip_ids, is_active
               FROM style_guides WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(style_guide_from_row).transpose()
    }

    /// Insert a new guide and make it the single active one. Deactivation of
    /// prior guides and the insert commit together.
    pub async fn create_style_guide(&self, new: NewStyleGuide) -> Result<StyleGuide> {
        let now = now_rfc3339();
        let guide = StyleGuide {
            id: Uuid::new_v4().to_string(),
            created_at: now.clone(),
            updated_at: now,
            title: new.title,
            content: new.content,
            based_on_clip_ids: new.based_on_clip_ids,
            is_active: true,
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query("UPDATE style_guides SET is_active = 0 WHERE is_active = 1")
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"INSERT INTO style_guides
               (id, created_at, updated_at, title, content, based_on_clip_ids, is_active)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1)"#,
        )
        .bind(&guide.id)
        .bind(&guide.created_at)
        .bind(&guide.updated_at)
        .bind(&guide.title)
        .bind(&guide.content)
        .bind(serde_json::to_string(&guide.based_on_clip_ids)?)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(guide_id = %guide.id, title = %guide.title, "store.create_style_guide");
        Ok(guide)
    }

    /// Apply a partial update and touch `updated_at`. Activating a guide
    /// deactivates all others in the same transaction.
    pub async fn update_style_guide(
        &self,
        id: &str,
        update: StyleGuideUpdate,
    ) -> Result<Option<StyleGuide>> {
        let Some(mut guide) = self.get_style_guide(id).await? else {
            return Ok(None);
        };
        if let Some(title) = update.title {
            guide.title = title;
        }
        if let Some(content) = update.content {
            guide.content = content;
        }
        if let Some(active) = update.is_active {
            guide.is_active = active;
        }
        guide.updated_at = now_rfc3339();

        let mut tx = self.pool.begin().await?;
        if guide.is_active {
            sqlx::query("UPDATE style_guides SET is_active = 0 WHERE is_active = 1 AND id != ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query(
            r#"UPDATE style_guides
               SET title = ?1, content = ?2, is_active = ?3, updated_at = ?4
               WHERE id = ?5"#,
        )
        .bind(&guide.title)
        .bind(&guide.content)
        .bind(guide.is_active)
        .bind(&guide.updated_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        tracing::info!(guide_id = %id, active = guide.is_active, "store.update_style_guide");
        Ok(Some(guide))
    }

    pub async fn delete_style_guide(&self, id: &str) -> Result<bool> {
        let res = sqlx::query("DELETE FROM style_guides WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::info!(guide_id = %id, rows = res.rows_affected(), "store.delete_style_guide");
        Ok(res.rows_affected() > 0)
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

fn tags_from_json(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn object_from_json(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or(Value::Object(serde_json::Map::new()))
}

fn clip_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Clip> {
    let type_str: String = row.try_get("content_type")?;
    let content_type = ContentType::parse(&type_str)
        .ok_or_else(|| anyhow::anyhow!("unknown content_type in clips row: {type_str}"))?;
    Ok(Clip {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        content_type,
        content: row.try_get("content")?,
        source_url: row.try_get("source_url")?,
        source_author: row.try_get("source_author")?,
        source_publication: row.try_get("source_publication")?,
        user_notes: row.try_get("user_notes")?,
        tags: tags_from_json(&row.try_get::<String, _>("tags")?),
        raw_html: row.try_get("raw_html")?,
    })
}

fn feedback_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Feedback> {
    Ok(Feedback {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        my_text: row.try_get("my_text")?,
        editor_feedback: row.try_get("editor_feedback")?,
        context: row.try_get("context")?,
        tags: tags_from_json(&row.try_get::<String, _>("tags")?),
    })
}

fn analysis_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Analysis> {
    let type_str: String = row.try_get("analysis_type")?;
    let analysis_type = AnalysisType::parse(&type_str)
        .ok_or_else(|| anyhow::anyhow!("unknown analysis_type in analyses row: {type_str}"))?;
    Ok(Analysis {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        clip_id: row.try_get("clip_id")?,
        analysis_type,
        patterns: object_from_json(&row.try_get::<String, _>("patterns")?),
        style_elements: object_from_json(&row.try_get::<String, _>("style_elements")?),
        claude_response: row.try_get("claude_response")?,
    })
}

fn style_guide_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<StyleGuide> {
    Ok(StyleGuide {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        based_on_clip_ids: tags_from_json(&row.try_get::<String, _>("based_on_clip_ids")?),
        is_active: row.try_get::<i64, _>("is_active")? != 0,
    })
}
