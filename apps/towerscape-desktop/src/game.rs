//! A small tower-defense game that drives the adapter through its 2D API.

use towerscape_adapter::{GameHandler, SceneAdapter};
use towerscape_common::{GamePoint, LogicalSize, Rgb};

#[derive(Debug, Clone, Copy)]
pub struct TowerKind {
    pub name: &'static str,
    pub cost: u32,
    pub range: f32,
    pub damage: f32,
    pub color: Rgb,
}

pub const TOWER_KINDS: [TowerKind; 3] = [
    TowerKind {
        name: "arrow",
        cost: 50,
        range: 120.0,
        damage: 14.0,
        color: Rgb::new(0x42, 0xa5, 0xf5),
    },
    TowerKind {
        name: "cannon",
        cost: 80,
        range: 100.0,
        damage: 30.0,
        color: Rgb::new(0xff, 0xb7, 0x4d),
    },
    TowerKind {
        name: "frost",
        cost: 65,
        range: 90.0,
        damage: 8.0,
        color: Rgb::new(0x4d, 0xd0, 0xe1),
    },
];

const ENEMY_SPEED: f32 = 45.0;
const ENEMY_HEALTH: f32 = 60.0;
const SPAWN_INTERVAL: f32 = 1.5;
const BOUNTY: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Tower {
    col: i32,
    row: i32,
    kind: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Enemy {
    x: f32,
    health: f32,
}

/// Enemies walk one straight row from left to right; towers go anywhere else.
#[derive(Debug, Clone)]
pub struct DemoGame {
    size: LogicalSize,
    cell: f32,
    path_row: i32,
    towers: Vec<Tower>,
    enemies: Vec<Enemy>,
    selected: Option<usize>,
    spawn_timer: f32,
    pub gold: u32,
    pub lives: u32,
    pub kills: u32,
}

impl DemoGame {
    pub fn new(size: LogicalSize, cell: f32) -> Self {
        let rows = (size.height / cell).floor() as i32;
        Self {
            size,
            cell,
            path_row: rows / 2,
            towers: Vec::new(),
            enemies: Vec::new(),
            selected: None,
            spawn_timer: 0.0,
            gold: 200,
            lives: 10,
            kills: 0,
        }
    }

    pub fn select(&mut self, kind: Option<usize>) {
        self.selected = kind.filter(|k| *k < TOWER_KINDS.len());
    }

    pub fn selected(&self) -> Option<&'static TowerKind> {
        self.selected.map(|k| &TOWER_KINDS[k])
    }

    pub fn tower_count(&self) -> usize {
        self.towers.len()
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }

    fn cell_of(&self, point: GamePoint) -> (i32, i32) {
        (
            (point.x / self.cell).floor() as i32,
            (point.y / self.cell).floor() as i32,
        )
    }

    fn cell_center(&self, col: i32, row: i32) -> GamePoint {
        GamePoint::new(
            (col as f32 + 0.5) * self.cell,
            (row as f32 + 0.5) * self.cell,
        )
    }

    fn path_y(&self) -> f32 {
        (self.path_row as f32 + 0.5) * self.cell
    }

    /// Whether a tower may stand on the cell containing `point`.
    pub fn can_build(&self, point: GamePoint) -> bool {
        if point.is_none() || point.x >= self.size.width || point.y >= self.size.height {
            return false;
        }
        let (col, row) = self.cell_of(point);
        row != self.path_row && !self.towers.iter().any(|t| t.col == col && t.row == row)
    }

    /// Advance enemies, spawning and tower fire by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.lives == 0 {
            return;
        }
        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.spawn_timer += SPAWN_INTERVAL;
            self.enemies.push(Enemy {
                x: 0.0,
                health: ENEMY_HEALTH,
            });
        }

        let mut leaked = 0;
        let width = self.size.width;
        self.enemies.retain_mut(|enemy| {
            enemy.x += ENEMY_SPEED * dt;
            let inside = enemy.x < width;
            if !inside {
                leaked += 1;
            }
            inside
        });
        self.lives = self.lives.saturating_sub(leaked);

        let path_y = self.path_y();
        for tower in &self.towers {
            let kind = &TOWER_KINDS[tower.kind];
            let center = self.cell_center(tower.col, tower.row);
            let target = self
                .enemies
                .iter_mut()
                .filter(|e| {
                    let (dx, dy) = (e.x - center.x, path_y - center.y);
                    dx * dx + dy * dy <= kind.range * kind.range
                })
                .max_by(|a, b| a.x.total_cmp(&b.x));
            if let Some(enemy) = target {
                enemy.health -= kind.damage * dt;
            }
        }

        let before = self.enemies.len();
        self.enemies.retain(|e| e.health > 0.0);
        let killed = (before - self.enemies.len()) as u32;
        self.kills += killed;
        self.gold += killed * BOUNTY;
    }

    /// Issue this frame's draw calls.
    pub fn draw(&self, adapter: &mut SceneAdapter) {
        let path_y = self.path_y();
        adapter.draw_line(0.0, path_y, self.size.width, path_y, Rgb::new(0x8d, 0x6e, 0x63));

        for tower in &self.towers {
            let kind = &TOWER_KINDS[tower.kind];
            adapter.draw_rect(
                tower.col as f32 * self.cell,
                tower.row as f32 * self.cell,
                self.cell,
                self.cell,
                kind.color,
            );
        }
        for enemy in &self.enemies {
            let radius = 6.0 + 6.0 * (enemy.health / ENEMY_HEALTH).clamp(0.0, 1.0);
            adapter.draw_circle(enemy.x, path_y, radius, Rgb::new(0xe5, 0x39, 0x35), true);
        }
        adapter.draw_triangle(
            GamePoint::new(self.size.width - self.cell, path_y - self.cell / 2.0),
            GamePoint::new(self.size.width, path_y),
            GamePoint::new(self.size.width - self.cell, path_y + self.cell / 2.0),
            Rgb::new(0xff, 0xee, 0x58),
            true,
        );

        // lives as HUD pips along the top edge; the scene skips these
        for i in 0..self.lives.min(10) {
            adapter.draw_circle(20.0 + i as f32 * 20.0, 18.0, 7.0, Rgb::new(0xef, 0x53, 0x50), false);
        }
        let hud = format!("Gold {}  Lives {}  Kills {}", self.gold, self.lives, self.kills);
        adapter.draw_text(&hud, self.size.width / 2.0, self.cell, Rgb::WHITE, 18.0);
        if self.lives == 0 {
            adapter.draw_text(
                "Game over",
                self.size.width / 2.0,
                self.size.height / 2.0,
                Rgb::new(0xff, 0x44, 0x44),
                32.0,
            );
        }

        let hover = adapter.hover_position();
        match self.selected() {
            Some(kind) if !hover.is_none() => {
                let valid = self.can_build(hover) && self.gold >= kind.cost;
                adapter.draw_tower_preview(hover.x, hover.y, valid, kind.range);
            }
            _ => adapter.draw_tower_preview(-1.0, -1.0, false, 0.0),
        }
    }
}

impl GameHandler for DemoGame {
    fn handle_click(&mut self, x: f32, y: f32) {
        let point = GamePoint::new(x, y);
        let Some(index) = self.selected else {
            tracing::debug!("click at ({x}, {y}) with no tower selected");
            return;
        };
        let kind = &TOWER_KINDS[index];
        if !self.can_build(point) {
            tracing::debug!("cell at ({x}, {y}) is not buildable");
            return;
        }
        if self.gold < kind.cost {
            tracing::info!("not enough gold for {} ({} < {})", kind.name, self.gold, kind.cost);
            return;
        }
        let (col, row) = self.cell_of(point);
        self.gold -= kind.cost;
        self.towers.push(Tower {
            col,
            row,
            kind: index,
        });
        tracing::info!("built {} at cell ({col}, {row})", kind.name);
    }
}
