//! Robot icon and its peripherals, kept in sync with controller poses.
//!
//! The robot is drawn as a body rectangle plus a direction triangle that
//! share a center. Each tick the controller's real-world pose is converted
//! to the drawing frame and the shapes are moved by the difference from the
//! previous tick's drawing-frame pose, so error never accumulates across
//! ticks.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use nalgebra::{Point2, Vector2};
use simcore::{Color, Config, Pose, RobotController};

use crate::element::{CompositeElement, Drawable, DrawableElement, FieldElement};
use crate::error::FieldError;
use crate::surface::DrawingSurface;
use crate::transform::FieldTransform;

pub const BODY_COLOR: Color = Color::RED;
pub const INDICATOR_COLOR: Color = Color::GREEN;
/// Indicator color while the controller reports the robot inactive
pub const DISABLED_COLOR: Color = Color::GRAY;

const BODY: usize = 0;
const INDICATOR: usize = 1;

#[derive(Debug, Clone)]
struct Peripheral {
    element: DrawableElement,
    /// Last drawing-frame pose
    pose: Pose,
}

pub struct RobotElement<C: RobotController> {
    controller: Rc<RefCell<C>>,
    transform: FieldTransform,
    /// [body rectangle, direction triangle]
    shape: CompositeElement,
    /// Last drawing-frame pose of the body
    pose: Pose,
    peripherals: BTreeMap<String, Peripheral>,
}

impl<C: RobotController> RobotElement<C> {
    pub fn new(controller: Rc<RefCell<C>>, config: &Config) -> Self {
        let transform = FieldTransform::new(config);
        let robot = &config.robot;

        let start = Pose::new(robot.starting_x, robot.starting_y, robot.starting_heading());
        let pose = transform.pose_to_drawing(start);

        let w = transform.length(robot.w);
        let l = transform.length(robot.l);
        let (cx, cy) = (pose.x, pose.y);
        let center = Point2::new(cx, cy);

        let body = DrawableElement::new(
            vec![
                Point2::new(cx - w / 2.0, cy - l / 2.0),
                Point2::new(cx + w / 2.0, cy - l / 2.0),
                Point2::new(cx + w / 2.0, cy + l / 2.0),
                Point2::new(cx - w / 2.0, cy + l / 2.0),
            ],
            Some(center),
            BODY_COLOR,
        );
        let indicator = DrawableElement::new(
            vec![
                Point2::new(cx - w / 2.0, cy - l / 2.0),
                Point2::new(cx + w / 2.0, cy),
                Point2::new(cx - w / 2.0, cy + l / 2.0),
            ],
            Some(center),
            INDICATOR_COLOR,
        );

        let mut shape = CompositeElement::from_members(vec![body, indicator]);
        if pose.heading != 0.0 {
            shape.rotate(pose.heading);
        }

        let peripherals = robot
            .objects
            .iter()
            .map(|obj| {
                let points = obj
                    .points
                    .iter()
                    .map(|&[x, y]| transform.to_drawing(Point2::new(x, y)))
                    .collect();
                let center = transform.to_drawing(Point2::new(obj.center[0], obj.center[1]));
                let peripheral = Peripheral {
                    element: DrawableElement::new(points, Some(center), obj.color),
                    pose: Pose::new(center.x, center.y, 0.0),
                };
                (obj.name.clone(), peripheral)
            })
            .collect();

        log::info!(
            "robot {}x{} ft starting at ({}, {}) heading {} deg, {} peripheral(s)",
            robot.w,
            robot.l,
            robot.starting_x,
            robot.starting_y,
            robot.starting_angle,
            robot.objects.len()
        );

        RobotElement {
            controller,
            transform,
            shape,
            pose,
            peripherals,
        }
    }

    /// Current drawing-frame heading in radians.
    pub fn heading(&self) -> f64 {
        self.pose.heading
    }

    /// Last drawing-frame pose of the body.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Tip of the direction triangle.
    pub fn front_center(&self) -> Point2<f64> {
        self.indicator().points()[1]
    }

    pub fn center(&self) -> Option<Point2<f64>> {
        self.indicator().center()
    }

    pub fn body(&self) -> &DrawableElement {
        &self.shape.members()[BODY]
    }

    pub fn indicator(&self) -> &DrawableElement {
        &self.shape.members()[INDICATOR]
    }

    pub fn peripheral(&self, name: &str) -> Option<&DrawableElement> {
        self.peripherals.get(name).map(|p| &p.element)
    }

    pub fn peripheral_names(&self) -> impl Iterator<Item = &str> {
        self.peripherals.keys().map(String::as_str)
    }

    fn move_robot(&mut self) {
        let real = self.controller.borrow().pose();
        let new = self.transform.pose_to_drawing(real);
        let delta = new - self.pose;

        if delta.heading != 0.0 {
            self.shape.rotate(delta.heading);
        }
        self.shape.translate(Vector2::new(delta.x, delta.y));
        log::trace!("robot delta ({:.3}, {:.3}, {:.4})", delta.x, delta.y, delta.heading);

        self.pose = new;
    }

    fn move_peripherals(&mut self, surface: &mut dyn DrawingSurface) -> Result<(), FieldError> {
        let controller = self.controller.borrow();
        for (name, peripheral) in &mut self.peripherals {
            let real = controller.peripheral_pose(name)?;
            let new = self.transform.pose_to_drawing(real);
            let delta = new - peripheral.pose;

            if delta.heading != 0.0 {
                peripheral.element.rotate(delta.heading);
            }
            peripheral.element.translate(Vector2::new(delta.x, delta.y));
            peripheral.pose = new;
            peripheral.element.update_coordinates(surface);
        }
        Ok(())
    }
}

impl<C: RobotController> FieldElement for RobotElement<C> {
    /// Draw body, indicator, and peripherals, then register each
    /// peripheral with the controller in real-world units.
    fn attach(&mut self, surface: &mut dyn DrawingSurface) {
        self.shape.initialize(surface);
        let mut controller = self.controller.borrow_mut();
        for (name, peripheral) in &mut self.peripherals {
            peripheral.element.initialize(surface);
            controller.register_peripheral(name, self.transform.pose_to_real(peripheral.pose));
        }
    }

    fn perform_move(&mut self, surface: &mut dyn DrawingSurface) -> Result<(), FieldError> {
        let active = self.controller.borrow().is_active();
        let wanted = if active { INDICATOR_COLOR } else { DISABLED_COLOR };
        if self.indicator().color() != wanted {
            if let Some(indicator) = self.shape.get_mut(INDICATOR) {
                indicator.set_color(wanted, surface);
            }
        }

        self.move_robot();
        self.shape.update_coordinates(surface);

        self.move_peripherals(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::surface::{RecordingSurface, ShapeId};
    use approx::assert_relative_eq;
    use simcore::{Axis, ControllerError, FieldConfig, PeripheralConfig, RobotConfig};
    use std::collections::HashMap;
    use std::f64::consts::FRAC_PI_2;

    /// Controller whose poses are set directly by the test.
    #[derive(Default)]
    struct ScriptedController {
        pose: Pose,
        peripherals: HashMap<String, Pose>,
        registered: Vec<(String, Pose)>,
        inactive: bool,
    }

    impl RobotController for ScriptedController {
        fn pose(&self) -> Pose {
            self.pose
        }

        fn peripheral_pose(&self, name: &str) -> Result<Pose, ControllerError> {
            self.peripherals
                .get(name)
                .copied()
                .ok_or_else(|| ControllerError::UnknownPeripheral(name.to_owned()))
        }

        fn is_active(&self) -> bool {
            !self.inactive
        }

        fn register_peripheral(&mut self, name: &str, initial_pose: Pose) {
            self.registered.push((name.to_owned(), initial_pose));
            self.peripherals.insert(name.to_owned(), initial_pose);
        }
    }

    fn config(axis: Axis) -> Config {
        Config {
            sim_type: "test".to_owned(),
            margin: 20.0,
            axis,
            field: FieldConfig {
                w: 54,
                h: 27,
                px_per_ft: 10.0,
                image: None,
                objects: Vec::new(),
            },
            robot: RobotConfig {
                w: 2.0,
                l: 3.0,
                starting_x: 10.0,
                starting_y: 5.0,
                starting_angle: 0.0,
                objects: vec![PeripheralConfig {
                    name: "arm".to_owned(),
                    center: [11.0, 5.0],
                    points: vec![[10.5, 4.75], [12.5, 4.75], [12.5, 5.25], [10.5, 5.25]],
                    color: Color::GRAY,
                }],
            },
        }
    }

    struct Rig {
        controller: Rc<RefCell<ScriptedController>>,
        robot: RobotElement<ScriptedController>,
        surface: RecordingSurface,
    }

    fn rig(axis: Axis) -> Rig {
        let cfg = config(axis);
        let controller = Rc::new(RefCell::new(ScriptedController {
            pose: Pose::new(cfg.robot.starting_x, cfg.robot.starting_y, 0.0),
            ..Default::default()
        }));
        let mut robot = RobotElement::new(Rc::clone(&controller), &cfg);
        let mut surface = RecordingSurface::new();
        robot.attach(&mut surface);
        Rig {
            controller,
            robot,
            surface,
        }
    }

    // shape ids in attach order
    const BODY_ID: ShapeId = ShapeId(0);
    const INDICATOR_ID: ShapeId = ShapeId(1);
    const ARM_ID: ShapeId = ShapeId(2);

    #[test]
    fn test_starting_center_is_flipped() {
        let rig = rig(Axis::YUp);
        assert_eq!(rig.robot.center(), Some(Point2::new(120.0, 240.0)));
        assert_eq!(rig.robot.front_center(), Point2::new(130.0, 240.0));
        // 2 ft wide, 3 ft long
        assert_eq!(rig.robot.body().points()[0], Point2::new(110.0, 225.0));
        assert_eq!(rig.robot.body().points()[2], Point2::new(130.0, 255.0));
    }

    #[test]
    fn test_starting_angle_rotates_shape() {
        let mut cfg = config(Axis::YDown);
        cfg.robot.starting_angle = 90.0;
        let controller = Rc::new(RefCell::new(ScriptedController::default()));
        let robot = RobotElement::new(controller, &cfg);
        // facing +y (down the screen) in the y-down convention
        let front = robot.front_center();
        assert_relative_eq!(front.x, 120.0, epsilon = 1e-9);
        assert_relative_eq!(front.y, 80.0, epsilon = 1e-9);
        assert_relative_eq!(robot.heading(), FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn test_attach_registers_peripherals_in_real_units() {
        let rig = rig(Axis::YUp);
        let controller = rig.controller.borrow();
        assert_eq!(controller.registered.len(), 1);
        let (name, pose) = &controller.registered[0];
        assert_eq!(name, "arm");
        assert_relative_eq!(pose.x, 11.0, epsilon = 1e-9);
        assert_relative_eq!(pose.y, 5.0, epsilon = 1e-9);
        assert_relative_eq!(pose.heading, 0.0);

        assert_eq!(rig.surface.items().len(), 3);
        assert_eq!(rig.surface.fill(ARM_ID), Some(Color::GRAY));
    }

    #[test]
    fn test_redraw_is_idempotent() {
        let mut rig = rig(Axis::YUp);
        rig.robot.perform_move(&mut rig.surface).unwrap();
        let first = rig.surface.items().to_vec();
        rig.robot.perform_move(&mut rig.surface).unwrap();
        assert_eq!(rig.surface.items(), first.as_slice());
        assert_eq!(rig.surface.polygon_points(INDICATOR_ID).unwrap()[1], Point2::new(130.0, 240.0));
    }

    #[test]
    fn test_translation_follows_controller() {
        let mut rig = rig(Axis::YUp);
        rig.controller.borrow_mut().pose = Pose::new(12.0, 8.0, 0.0);
        rig.robot.perform_move(&mut rig.surface).unwrap();

        // +2 ft right, +3 ft up -> +20 px, -30 px
        assert_eq!(rig.robot.center(), Some(Point2::new(140.0, 210.0)));
        assert_eq!(rig.surface.polygon_points(BODY_ID).unwrap()[0], Point2::new(130.0, 195.0));
        assert_eq!(rig.robot.pose(), Pose::new(140.0, 210.0, 0.0));
    }

    #[test]
    fn test_quarter_turn_rotates_about_center() {
        let mut rig = rig(Axis::YDown);
        let center = rig.robot.center().unwrap();
        let before: Vec<Point2<f64>> = rig.robot.body().points().to_vec();

        rig.controller.borrow_mut().pose.heading = FRAC_PI_2;
        rig.robot.perform_move(&mut rig.surface).unwrap();

        assert_eq!(rig.robot.center(), Some(center));
        for (old, new) in before.iter().zip(rig.surface.polygon_points(BODY_ID).unwrap()) {
            let o = old - center;
            let n = new - center;
            // (x, y) -> (-y, x)
            assert_relative_eq!(n.x, -o.y, epsilon = 1e-9);
            assert_relative_eq!(n.y, o.x, epsilon = 1e-9);
        }
        let tip = rig.robot.front_center();
        assert_relative_eq!(tip.x, center.x, epsilon = 1e-9);
        assert_relative_eq!(tip.y, center.y + 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_y_up_heading_turns_counterclockwise_on_screen() {
        let mut rig = rig(Axis::YUp);
        rig.controller.borrow_mut().pose.heading = FRAC_PI_2;
        rig.robot.perform_move(&mut rig.surface).unwrap();

        // facing real-world +y means facing up the screen
        let tip = rig.robot.front_center();
        assert_relative_eq!(tip.x, 120.0, epsilon = 1e-9);
        assert_relative_eq!(tip.y, 230.0, epsilon = 1e-9);
        assert_relative_eq!(rig.robot.heading(), -FRAC_PI_2);
    }

    #[test]
    fn test_inactive_recolors_indicator_but_keeps_moving() {
        let mut rig = rig(Axis::YUp);
        {
            let mut controller = rig.controller.borrow_mut();
            controller.inactive = true;
            controller.pose.x += 1.0;
        }
        rig.robot.perform_move(&mut rig.surface).unwrap();
        assert_eq!(rig.surface.fill(INDICATOR_ID), Some(DISABLED_COLOR));
        assert_eq!(rig.surface.fill(BODY_ID), Some(BODY_COLOR));
        assert_eq!(rig.robot.center(), Some(Point2::new(130.0, 240.0)));

        rig.controller.borrow_mut().inactive = false;
        rig.robot.perform_move(&mut rig.surface).unwrap();
        assert_eq!(rig.surface.fill(INDICATOR_ID), Some(INDICATOR_COLOR));
    }

    #[test]
    fn test_peripheral_follows_its_own_pose() {
        let mut rig = rig(Axis::YUp);
        rig.controller
            .borrow_mut()
            .peripherals
            .insert("arm".to_owned(), Pose::new(11.0, 6.0, FRAC_PI_2));
        rig.robot.perform_move(&mut rig.surface).unwrap();

        let arm = rig.robot.peripheral("arm").unwrap();
        let center = arm.center().unwrap();
        assert_relative_eq!(center.x, 130.0, epsilon = 1e-9);
        assert_relative_eq!(center.y, 230.0, epsilon = 1e-9);
        // the arm pointed along +x; after a real-world quarter turn it points up the screen
        let points = rig.surface.polygon_points(ARM_ID).unwrap();
        assert_relative_eq!(points[1].x, 132.5, epsilon = 1e-9);
        assert_relative_eq!(points[1].y, 215.0, epsilon = 1e-9);
        // the body did not move
        assert_eq!(rig.robot.center(), Some(Point2::new(120.0, 240.0)));
    }

    #[test]
    fn test_unknown_peripheral_aborts_tick() {
        let mut rig = rig(Axis::YUp);
        rig.controller.borrow_mut().peripherals.clear();
        let err = rig.robot.perform_move(&mut rig.surface).unwrap_err();
        assert!(matches!(err, FieldError::Controller(ControllerError::UnknownPeripheral(name)) if name == "arm"));
    }

    #[test]
    fn test_robot_on_field() {
        let cfg = config(Axis::YUp);
        let controller = Rc::new(RefCell::new(ScriptedController {
            pose: Pose::new(10.0, 5.0, 0.0),
            ..Default::default()
        }));
        let mut field = Field::new(&cfg, RecordingSurface::new());
        field.add_moving_element(Box::new(RobotElement::new(Rc::clone(&controller), &cfg)));

        let cells = 27 * 54;
        assert_eq!(field.surface().items().len(), cells + 3);

        controller.borrow_mut().pose = Pose::new(11.0, 5.0, 0.0);
        field.update_widgets().unwrap();
        let body = field.surface().polygon_points(ShapeId(cells)).unwrap();
        assert_eq!(body[0], Point2::new(120.0, 225.0));
    }
}
